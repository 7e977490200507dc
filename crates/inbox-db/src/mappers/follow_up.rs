//! Follow-up model <-> entity mappers

use chrono::{DateTime, Utc};
use inbox_core::entities::{
    FollowUpQueueItem, FollowUpSequence, FollowUpStep, QueueStatus, StepContent,
};
use inbox_core::{DomainError, OperatingHours};
use uuid::Uuid;

use crate::models::{QueueItemModel, SequenceModel, StepModel};

/// Sequences with unreadable operating hours are rejected instead of
/// silently running around the clock
impl TryFrom<SequenceModel> for FollowUpSequence {
    type Error = DomainError;

    fn try_from(model: SequenceModel) -> Result<Self, Self::Error> {
        let operating_hours = model
            .operating_hours
            .filter(|v| !v.is_null())
            .map(serde_json::from_value::<OperatingHours>)
            .transpose()
            .map_err(|e| {
                DomainError::ValidationError(format!(
                    "invalid operating hours on sequence {}: {e}",
                    model.id
                ))
            })?;

        Ok(FollowUpSequence {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            is_active: model.is_active,
            stop_on_reply: model.stop_on_reply,
            agent_id: model.agent_id,
            operating_hours,
        })
    }
}

impl From<StepModel> for FollowUpStep {
    fn from(model: StepModel) -> Self {
        let content = match model.content_type.as_str() {
            "ai" => StepContent::Ai(model.content),
            _ => StepContent::Template(model.content),
        };

        FollowUpStep {
            id: model.id,
            sequence_id: model.sequence_id,
            position: model.position,
            delay_minutes: model.delay_minutes,
            content,
        }
    }
}

/// Split step content into the `(content_type, content)` column pair
pub fn step_content_parts(content: &StepContent) -> (&'static str, &str) {
    match content {
        StepContent::Template(text) | StepContent::Ai(text) => (content.kind(), text.as_str()),
    }
}

impl From<QueueItemModel> for FollowUpQueueItem {
    fn from(model: QueueItemModel) -> Self {
        FollowUpQueueItem {
            id: model.id,
            company_id: model.company_id,
            sequence_id: model.sequence_id,
            step_id: model.step_id,
            conversation_id: model.conversation_id,
            status: QueueStatus::parse(&model.status).unwrap_or(QueueStatus::Failed),
            scheduled_at: model.scheduled_at,
            attempts: model.attempts,
            locked_until: model.locked_until,
            lease_token: model.lease_token,
            last_error: model.last_error,
            created_at: model.created_at,
            processed_at: model.processed_at,
        }
    }
}

/// Queue item values for database insertion
pub struct QueueItemInsert {
    pub id: Uuid,
    pub company_id: Uuid,
    pub sequence_id: Uuid,
    pub step_id: Uuid,
    pub conversation_id: Uuid,
    pub status: &'static str,
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl QueueItemInsert {
    pub fn new(item: &FollowUpQueueItem) -> Self {
        Self {
            id: item.id,
            company_id: item.company_id,
            sequence_id: item.sequence_id,
            step_id: item.step_id,
            conversation_id: item.conversation_id,
            status: item.status.as_str(),
            scheduled_at: item.scheduled_at,
            created_at: item.created_at,
        }
    }
}
