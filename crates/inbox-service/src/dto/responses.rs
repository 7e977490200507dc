//! Response DTOs for API endpoints
//!
//! Successful payloads carry `success: true` next to the data, mirroring
//! the `{success: false, error, code}` error envelope.

use chrono::{DateTime, Utc};
use inbox_core::{MessageDirection, MessageStatus, MessageType};
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// Message Responses
// ============================================================================

/// Message as returned to the inbox UI
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub direction: MessageDirection,
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_mime: Option<String>,
    pub status: MessageStatus,
    pub provider_message_id: Option<String>,
    pub reply_to_id: Option<Uuid>,
    pub sender_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// `{success: true, message: {...}}`
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub success: bool,
    pub message: MessageResponse,
}

impl SendMessageResponse {
    pub fn new(message: MessageResponse) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

// ============================================================================
// Follow-up Responses
// ============================================================================

/// Outcome counts of one processor run
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ProcessReport {
    pub claimed: usize,
    pub sent: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub rescheduled: usize,
}

impl ProcessReport {
    /// Items claimed but not settled by this run
    pub fn unsettled(&self) -> usize {
        self.claimed
            .saturating_sub(self.sent + self.failed + self.cancelled + self.rescheduled)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessDueResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: ProcessReport,
}

impl From<ProcessReport> for ProcessDueResponse {
    fn from(report: ProcessReport) -> Self {
        Self {
            success: true,
            report,
        }
    }
}

// ============================================================================
// Webhook Responses
// ============================================================================

/// What happened to a delivered webhook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Applied,
    /// Already processed within the ledger TTL
    Duplicate,
    /// Acknowledged without changes
    Ignored(String),
}

/// Body returned to Stripe
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

impl From<&WebhookOutcome> for WebhookAck {
    fn from(outcome: &WebhookOutcome) -> Self {
        Self {
            received: true,
            duplicate: matches!(outcome, WebhookOutcome::Duplicate),
        }
    }
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each backing service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, redis_healthy: bool) -> Self {
        let all_healthy = database_healthy && redis_healthy;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
                redis: if redis_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
