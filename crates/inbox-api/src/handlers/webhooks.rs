//! Third-party webhooks
//!
//! The Stripe handler needs the raw body: the signature covers the exact bytes.

use axum::{extract::State, http::HeaderMap, Json};
use bytes::Bytes;
use chrono::Utc;
use inbox_common::AppError;
use inbox_service::dto::WebhookAck;
use inbox_service::BillingService;

use crate::response::ApiResult;
use crate::state::AppState;

pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

/// Stripe billing events
///
/// POST /webhooks/stripe
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::InvalidSignature("missing Stripe-Signature header".to_string()))?;

    let outcome = BillingService::new(state.service_context())
        .handle_stripe_webhook(&body, signature, Utc::now().timestamp())
        .await?;

    Ok(Json(WebhookAck::from(&outcome)))
}
