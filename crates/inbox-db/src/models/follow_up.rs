//! Follow-up sequence, step and queue database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for followup_sequences table
#[derive(Debug, Clone, FromRow)]
pub struct SequenceModel {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub stop_on_reply: bool,
    pub agent_id: Option<Uuid>,
    pub operating_hours: Option<serde_json::Value>,
}

/// Database model for followup_steps table
#[derive(Debug, Clone, FromRow)]
pub struct StepModel {
    pub id: Uuid,
    pub sequence_id: Uuid,
    pub position: i32,
    pub delay_minutes: i32,
    pub content_type: String,
    pub content: String,
}

/// Database model for followup_queue table
#[derive(Debug, Clone, FromRow)]
pub struct QueueItemModel {
    pub id: Uuid,
    pub company_id: Uuid,
    pub sequence_id: Uuid,
    pub step_id: Uuid,
    pub conversation_id: Uuid,
    pub status: String,
    pub scheduled_at: DateTime<Utc>,
    pub attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub lease_token: Option<Uuid>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}
