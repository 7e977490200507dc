//! Follow-up sequences, steps and queue items
//!
//! A sequence is an ordered list of steps. Enrolling a conversation creates a
//! queue item for the first step; sending a step enqueues the next one.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::OperatingHours;

/// Lifecycle of a queue item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Processing,
    Sent,
    Failed,
    Cancelled,
}

impl QueueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "sent" => Some(Self::Sent),
            "failed" => Some(Self::Failed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sent | Self::Failed | Self::Cancelled)
    }
}

/// Follow-up sequence
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUpSequence {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub is_active: bool,
    /// Cancel pending items once the contact writes back
    pub stop_on_reply: bool,
    pub agent_id: Option<Uuid>,
    pub operating_hours: Option<OperatingHours>,
}

/// How a step produces its text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepContent {
    /// Static text with `{{placeholders}}`
    Template(String),
    /// Instructions handed to the sequence's AI agent
    Ai(String),
}

impl StepContent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Template(_) => "template",
            Self::Ai(_) => "ai",
        }
    }
}

/// One step of a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpStep {
    pub id: Uuid,
    pub sequence_id: Uuid,
    /// 1-based order inside the sequence
    pub position: i32,
    /// Wait after the previous step before this one fires
    pub delay_minutes: i32,
    pub content: StepContent,
}

impl FollowUpStep {
    /// When this step should fire if the previous one went out at `from`
    pub fn schedule_after(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        from + Duration::minutes(i64::from(self.delay_minutes.max(0)))
    }
}

/// One scheduled send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpQueueItem {
    pub id: Uuid,
    pub company_id: Uuid,
    pub sequence_id: Uuid,
    pub step_id: Uuid,
    pub conversation_id: Uuid,
    pub status: QueueStatus,
    pub scheduled_at: DateTime<Utc>,
    /// Number of times the item has been claimed
    pub attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    /// Set by each claim; only the holder of the current token may renew or settle
    pub lease_token: Option<Uuid>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl FollowUpQueueItem {
    /// Create a pending item for a step
    pub fn new(
        company_id: Uuid,
        sequence_id: Uuid,
        step_id: Uuid,
        conversation_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            sequence_id,
            step_id,
            conversation_id,
            status: QueueStatus::Pending,
            scheduled_at,
            attempts: 0,
            locked_until: None,
            lease_token: None,
            last_error: None,
            created_at: Utc::now(),
            processed_at: None,
        }
    }

    /// Whether a worker may pick this item up at `now`
    pub fn is_claimable(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            QueueStatus::Pending => self.scheduled_at <= now,
            QueueStatus::Processing => self.locked_until.is_some_and(|until| until < now),
            _ => false,
        }
    }
}
