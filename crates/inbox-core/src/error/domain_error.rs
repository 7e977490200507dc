//! Domain errors - error types for the domain layer

use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Company not found: {0}")]
    CompanyNotFound(Uuid),

    #[error("Profile not found for user: {0}")]
    ProfileNotFound(Uuid),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(Uuid),

    #[error("Contact not found: {0}")]
    ContactNotFound(Uuid),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(Uuid),

    #[error("Message not found: {0}")]
    MessageNotFound(Uuid),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("File too large: {actual} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize, actual: usize },

    #[error("Invalid reply target: {0}")]
    InvalidReplyTarget(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing permission: {0}")]
    MissingPermission(String),

    #[error("Resource belongs to another company")]
    ForeignCompany,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("WhatsApp connection is not connected")]
    ConnectionNotConnected,

    #[error("Queue item is not in a processable state")]
    QueueItemNotClaimable,

    // =========================================================================
    // Upstream Errors (gateway, LLM, storage)
    // =========================================================================
    #[error("Messaging gateway error: {0}")]
    GatewayError(String),

    #[error("Content generation error: {0}")]
    GenerationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::CompanyNotFound(_) => "UNKNOWN_COMPANY",
            Self::ProfileNotFound(_) => "UNKNOWN_PROFILE",
            Self::ConversationNotFound(_) => "UNKNOWN_CONVERSATION",
            Self::ContactNotFound(_) => "UNKNOWN_CONTACT",
            Self::ConnectionNotFound(_) => "UNKNOWN_CONNECTION",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::InvalidReplyTarget(_) => "INVALID_REPLY_TARGET",

            // Authorization
            Self::MissingPermission(_) => "MISSING_PERMISSIONS",
            Self::ForeignCompany => "FORBIDDEN",

            // Conflict
            Self::ConnectionNotConnected => "CONNECTION_NOT_CONNECTED",
            Self::QueueItemNotClaimable => "QUEUE_ITEM_NOT_CLAIMABLE",

            // Upstream
            Self::GatewayError(_) => "GATEWAY_ERROR",
            Self::GenerationError(_) => "GENERATION_ERROR",
            Self::StorageError(_) => "STORAGE_ERROR",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CompanyNotFound(_)
                | Self::ProfileNotFound(_)
                | Self::ConversationNotFound(_)
                | Self::ContactNotFound(_)
                | Self::ConnectionNotFound(_)
                | Self::MessageNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::ContentTooLong { .. }
                | Self::PayloadTooLarge { .. }
                | Self::InvalidReplyTarget(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingPermission(_) | Self::ForeignCompany)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::ConnectionNotConnected | Self::QueueItemNotClaimable
        )
    }

    /// Check if an external provider failed
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::GatewayError(_) | Self::GenerationError(_) | Self::StorageError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::ConversationNotFound(Uuid::nil());
        assert_eq!(err.code(), "UNKNOWN_CONVERSATION");

        let err = DomainError::MissingPermission("SEND_MESSAGES".to_string());
        assert_eq!(err.code(), "MISSING_PERMISSIONS");

        assert_eq!(
            DomainError::ConnectionNotConnected.code(),
            "CONNECTION_NOT_CONNECTED"
        );
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::ContactNotFound(Uuid::nil()).is_not_found());
        assert!(DomainError::ForeignCompany.is_authorization());
        assert!(DomainError::ConnectionNotConnected.is_conflict());
        assert!(DomainError::GatewayError("timeout".to_string()).is_upstream());
        assert!(!DomainError::DatabaseError("x".to_string()).is_upstream());
        assert!(DomainError::PayloadTooLarge { limit: 1, actual: 2 }.is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::ContentTooLong { max: 4096 };
        assert_eq!(err.to_string(), "Content too long: max 4096 characters");

        let err = DomainError::GatewayError("HTTP 500: boom".to_string());
        assert_eq!(err.to_string(), "Messaging gateway error: HTTP 500: boom");
    }
}
