//! Entity to DTO conversions

use inbox_core::Message;

use super::responses::MessageResponse;

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            direction: message.direction,
            message_type: message.message_type,
            content: message.content,
            media_url: message.media_url,
            media_mime: message.media_mime,
            status: message.status,
            provider_message_id: message.provider_message_id,
            reply_to_id: message.reply_to_id,
            sender_id: message.sender_id,
            error_message: message.error_message,
            created_at: message.created_at,
            sent_at: message.sent_at,
        }
    }
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self::from(message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inbox_core::MessageType;
    use uuid::Uuid;

    #[test]
    fn test_message_response_serialization() {
        let mut message =
            Message::new_outbound(Uuid::new_v4(), Uuid::new_v4(), MessageType::Image, None)
                .with_media("https://cdn.test/a.png", "image/png");
        message.mark_sent(Some("WA-1".to_string()), chrono::Utc::now());

        let json = serde_json::to_value(MessageResponse::from(&message)).unwrap();
        assert_eq!(json["direction"], "outbound");
        assert_eq!(json["message_type"], "image");
        assert_eq!(json["status"], "sent");
        assert_eq!(json["provider_message_id"], "WA-1");
        assert!(json.get("content").is_none());
        assert!(json.get("error_message").is_none());
    }
}
