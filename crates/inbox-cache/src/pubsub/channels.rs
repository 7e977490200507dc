//! Pub/Sub channel definitions.
//!
//! Inbox clients subscribe to their company channel for conversation lists
//! and to a conversation channel while a thread is open.

use uuid::Uuid;

/// Channel prefix for company-wide events
pub const COMPANY_CHANNEL_PREFIX: &str = "company:";
/// Channel prefix for conversation events
pub const CONVERSATION_CHANNEL_PREFIX: &str = "conversation:";

/// Pub/Sub channel types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Events for every member of a company
    Company(Uuid),
    /// Events for one conversation thread
    Conversation(Uuid),
    /// Custom channel name
    Custom(String),
}

impl PubSubChannel {
    #[must_use]
    pub fn company(company_id: Uuid) -> Self {
        Self::Company(company_id)
    }

    #[must_use]
    pub fn conversation(conversation_id: Uuid) -> Self {
        Self::Conversation(conversation_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Company(id) => format!("{COMPANY_CHANNEL_PREFIX}{id}"),
            Self::Conversation(id) => format!("{CONVERSATION_CHANNEL_PREFIX}{id}"),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if let Some(id) = name
            .strip_prefix(COMPANY_CHANNEL_PREFIX)
            .and_then(|s| Uuid::parse_str(s).ok())
        {
            return Self::Company(id);
        }

        if let Some(id) = name
            .strip_prefix(CONVERSATION_CHANNEL_PREFIX)
            .and_then(|s| Uuid::parse_str(s).ok())
        {
            return Self::Conversation(id);
        }

        Self::Custom(name.to_string())
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names_parse_back() {
        let id = Uuid::new_v4();

        let company = PubSubChannel::company(id);
        assert_eq!(company.name(), format!("company:{id}"));
        assert_eq!(PubSubChannel::parse(&company.name()), company);

        let conversation = PubSubChannel::conversation(id);
        assert_eq!(conversation.to_string(), format!("conversation:{id}"));
        assert_eq!(PubSubChannel::parse(&conversation.name()), conversation);
    }

    #[test]
    fn test_unknown_channel_is_custom() {
        assert_eq!(
            PubSubChannel::parse("company:not-a-uuid"),
            PubSubChannel::Custom("company:not-a-uuid".to_string())
        );
    }
}
