//! Message entity <-> model mapper

use chrono::{DateTime, Utc};
use inbox_core::entities::{Message, MessageDirection, MessageStatus, MessageType};
use uuid::Uuid;

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
///
/// Values written by other clients that this service doesn't know fall back
/// to the most conservative variant.
impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: model.id,
            company_id: model.company_id,
            conversation_id: model.conversation_id,
            direction: MessageDirection::parse(&model.direction)
                .unwrap_or(MessageDirection::Inbound),
            message_type: MessageType::parse(&model.message_type).unwrap_or(MessageType::Text),
            content: model.content,
            media_url: model.media_url,
            media_mime: model.media_mime,
            status: MessageStatus::parse(&model.status).unwrap_or(MessageStatus::Pending),
            provider_message_id: model.provider_message_id,
            reply_to_id: model.reply_to_id,
            sender_id: model.sender_id,
            error_message: model.error_message,
            created_at: model.created_at,
            sent_at: model.sent_at,
        }
    }
}

/// Message entity values for database insertion
pub struct MessageInsert<'a> {
    pub id: Uuid,
    pub company_id: Uuid,
    pub conversation_id: Uuid,
    pub direction: &'static str,
    pub message_type: &'static str,
    pub content: Option<&'a str>,
    pub media_url: Option<&'a str>,
    pub media_mime: Option<&'a str>,
    pub status: &'static str,
    pub provider_message_id: Option<&'a str>,
    pub reply_to_id: Option<Uuid>,
    pub sender_id: Option<Uuid>,
    pub error_message: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id,
            company_id: message.company_id,
            conversation_id: message.conversation_id,
            direction: message.direction.as_str(),
            message_type: message.message_type.as_str(),
            content: message.content.as_deref(),
            media_url: message.media_url.as_deref(),
            media_mime: message.media_mime.as_deref(),
            status: message.status.as_str(),
            provider_message_id: message.provider_message_id.as_deref(),
            reply_to_id: message.reply_to_id,
            sender_id: message.sender_id,
            error_message: message.error_message.as_deref(),
            created_at: message.created_at,
            sent_at: message.sent_at,
        }
    }
}
