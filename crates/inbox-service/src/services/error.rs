//! Service layer errors
//!
//! Use cases fail with domain errors from the ports, application errors from
//! token and signature checks, or a few conditions only the service layer
//! can tell apart.

use inbox_common::AppError;
use inbox_core::DomainError;
use std::fmt;

#[derive(Debug)]
pub enum ServiceError {
    Domain(DomainError),
    App(AppError),
    /// A row the use case needed is gone
    NotFound { resource: &'static str, id: String },
    /// Authenticated, but not allowed to act (no profile, wrong company)
    Forbidden(String),
    Validation(String),
    /// Wiring problem, e.g. a missing dependency in the context
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Forbidden(reason) => write!(f, "Access denied: {reason}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status and envelope code
    fn classify(&self) -> (u16, &str) {
        match self {
            Self::Domain(e) => (AppError::domain_status(e), e.code()),
            Self::App(e) => (e.status_code(), e.error_code()),
            Self::NotFound { .. } => (404, "NOT_FOUND"),
            Self::Forbidden(_) => (403, "FORBIDDEN"),
            Self::Validation(_) => (400, "VALIDATION_ERROR"),
            Self::Internal(_) => (500, "INTERNAL_ERROR"),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.classify().0
    }

    pub fn error_code(&self) -> &str {
        self.classify().1
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => AppError::NotFound(format!("{resource} {id}")),
            ServiceError::Forbidden(_) => AppError::InsufficientPermissions,
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_not_found_error() {
        let err = ServiceError::not_found("Profile", "123");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.to_string().contains("Profile not found: 123"));
    }

    #[test]
    fn test_forbidden_error() {
        let err = ServiceError::forbidden("no profile");
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert_eq!(err.to_string(), "Access denied: no profile");
    }

    #[test]
    fn test_domain_error_status() {
        let err = ServiceError::from(DomainError::ConversationNotFound(Uuid::nil()));
        assert_eq!(err.status_code(), 404);

        let err = ServiceError::from(DomainError::ConnectionNotConnected);
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "CONNECTION_NOT_CONNECTED");

        let err = ServiceError::from(DomainError::PayloadTooLarge {
            limit: 10,
            actual: 11,
        });
        assert_eq!(err.status_code(), 413);

        let err = ServiceError::from(DomainError::GatewayError("down".to_string()));
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.error_code(), "GATEWAY_ERROR");
    }

    #[test]
    fn test_convert_to_app_error() {
        let app_err: AppError = ServiceError::validation("bad base64").into();
        assert_eq!(app_err.status_code(), 400);

        let app_err: AppError = ServiceError::from(DomainError::InvalidReplyTarget("x".into())).into();
        assert_eq!(app_err.status_code(), 400);
    }
}
