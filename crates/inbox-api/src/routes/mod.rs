//! Route definitions
//!
//! Inbox routes are mounted under /api/v1.

use axum::{routing::{get, post}, Router};

use crate::handlers::{follow_ups, health, messages, webhooks};
use crate::state::AppState;

/// Authenticated API routes (rate limited)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health and webhook routes, kept outside the rate limiter
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/v1/webhooks/stripe", post(webhooks::stripe))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(message_routes())
        .route("/follow-ups/process", post(follow_ups::process_due))
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages/text", post(messages::send_text))
        .route("/messages/image", post(messages::send_image))
        .route("/messages/audio", post(messages::send_audio))
}
