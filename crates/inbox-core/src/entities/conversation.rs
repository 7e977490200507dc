//! Conversation entity - a thread between one contact and one connection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbox status of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Open,
    Pending,
    Closed,
}

impl ConversationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Pending => "pending",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "closed" | "resolved" => Self::Closed,
            _ => Self::Open,
        }
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: Uuid,
    pub company_id: Uuid,
    pub connection_id: Uuid,
    pub contact_id: Uuid,
    pub status: ConversationStatus,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_inbound_at: Option<DateTime<Utc>>,
}

impl Conversation {
    /// Whether the contact wrote after the given instant
    pub fn contact_replied_since(&self, since: DateTime<Utc>) -> bool {
        self.last_inbound_at.is_some_and(|at| at > since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_contact_replied_since() {
        let enrolled = Utc::now();
        let mut conv = Conversation {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            contact_id: Uuid::new_v4(),
            status: ConversationStatus::Open,
            last_message_at: None,
            last_inbound_at: None,
        };
        assert!(!conv.contact_replied_since(enrolled));

        conv.last_inbound_at = Some(enrolled - Duration::minutes(5));
        assert!(!conv.contact_replied_since(enrolled));

        conv.last_inbound_at = Some(enrolled + Duration::minutes(5));
        assert!(conv.contact_replied_since(enrolled));
    }
}
