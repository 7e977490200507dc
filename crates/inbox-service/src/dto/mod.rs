//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs
//! - Stripe webhook payloads

pub mod mappers;
pub mod requests;
pub mod responses;
pub mod stripe;

pub use requests::{SendAudioRequest, SendImageRequest, SendTextRequest, MAX_TEXT_CHARS};
pub use responses::{
    HealthChecks, HealthResponse, MessageResponse, ProcessDueResponse, ProcessReport,
    ReadinessResponse, SendMessageResponse, WebhookAck, WebhookOutcome,
};
pub use stripe::{CheckoutSession, Invoice, StripeEvent, Subscription};
