//! # inbox-api
//!
//! REST API server built with Axum: outbound senders, the follow-up trigger,
//! the Stripe webhook and health probes.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, shutdown_signal};
pub use state::AppState;
