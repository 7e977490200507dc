//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: Uuid,
    pub company_id: Uuid,
    pub conversation_id: Uuid,
    pub direction: String,
    pub message_type: String,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_mime: Option<String>,
    pub status: String,
    pub provider_message_id: Option<String>,
    pub reply_to_id: Option<Uuid>,
    pub sender_id: Option<Uuid>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl MessageModel {
    /// Check if the message has media attached
    #[inline]
    pub fn has_media(&self) -> bool {
        self.media_url.is_some()
    }
}
