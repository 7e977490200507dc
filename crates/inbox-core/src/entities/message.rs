//! Message entity - one WhatsApp message in a conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who sent the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

impl MessageDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }
}

/// Payload kind of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Audio,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }
}

/// Delivery status of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sent,
    Delivered,
    Read,
    Failed,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "sent" => Some(Self::Sent),
            "delivered" => Some(Self::Delivered),
            "read" => Some(Self::Read),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Final states never go back to pending
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub company_id: Uuid,
    pub conversation_id: Uuid,
    pub direction: MessageDirection,
    pub message_type: MessageType,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_mime: Option<String>,
    pub status: MessageStatus,
    pub provider_message_id: Option<String>,
    pub reply_to_id: Option<Uuid>,
    /// Team member who sent it; `None` for automated sends
    pub sender_id: Option<Uuid>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a new outbound message in `pending` state
    pub fn new_outbound(
        company_id: Uuid,
        conversation_id: Uuid,
        message_type: MessageType,
        sender_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            conversation_id,
            direction: MessageDirection::Outbound,
            message_type,
            content: None,
            media_url: None,
            media_mime: None,
            status: MessageStatus::Pending,
            provider_message_id: None,
            reply_to_id: None,
            sender_id,
            error_message: None,
            created_at: Utc::now(),
            sent_at: None,
        }
    }

    /// Set text content (or caption for media)
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Attach an uploaded media object
    #[must_use]
    pub fn with_media(mut self, url: impl Into<String>, mime: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self.media_mime = Some(mime.into());
        self
    }

    /// Mark as a reply to another message
    #[must_use]
    pub fn replying_to(mut self, reply_to_id: Option<Uuid>) -> Self {
        self.reply_to_id = reply_to_id;
        self
    }

    /// Record a successful gateway send
    pub fn mark_sent(&mut self, provider_message_id: Option<String>, at: DateTime<Utc>) {
        self.status = MessageStatus::Sent;
        self.provider_message_id = provider_message_id;
        self.sent_at = Some(at);
        self.error_message = None;
    }

    /// Record a failed gateway send
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = MessageStatus::Failed;
        self.error_message = Some(reason.into());
    }

    #[inline]
    pub fn is_inbound(&self) -> bool {
        self.direction == MessageDirection::Inbound
    }

    /// Get a truncated preview of the message (for conversation lists)
    pub fn preview(&self, max_len: usize) -> &str {
        let content = self.content.as_deref().unwrap_or("");
        if content.len() <= max_len {
            content
        } else {
            let mut end = max_len;
            while !content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &content[..end]
        }
    }
}
