//! Adapter errors and their mapping onto domain errors

use inbox_core::DomainError;
use thiserror::Error;

/// Which external service an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Gateway,
    Generator,
    Storage,
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Gateway => "UAZAPI",
            Self::Generator => "Gemini",
            Self::Storage => "Supabase Storage",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid provider configuration: {0}")]
    Config(String),

    #[error("{upstream} request failed: {message}")]
    Transport { upstream: Upstream, message: String },

    #[error("{upstream} returned {status}: {body}")]
    Status {
        upstream: Upstream,
        status: u16,
        body: String,
    },

    #[error("{upstream} response could not be parsed: {message}")]
    Decode { upstream: Upstream, message: String },

    #[error("{0} returned no content")]
    Empty(Upstream),
}

impl ProviderError {
    pub(crate) fn transport(upstream: Upstream, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        Self::Transport { upstream, message }
    }

    /// Service the error is attributed to
    pub fn upstream(&self) -> Option<Upstream> {
        match self {
            Self::Config(_) => None,
            Self::Transport { upstream, .. }
            | Self::Status { upstream, .. }
            | Self::Decode { upstream, .. } => Some(*upstream),
            Self::Empty(upstream) => Some(*upstream),
        }
    }
}

impl From<ProviderError> for DomainError {
    fn from(err: ProviderError) -> Self {
        let message = err.to_string();
        match err.upstream() {
            Some(Upstream::Gateway) => DomainError::GatewayError(message),
            Some(Upstream::Generator) => DomainError::GenerationError(message),
            Some(Upstream::Storage) => DomainError::StorageError(message),
            None => DomainError::InternalError(message),
        }
    }
}

/// Keep error bodies short enough for a log line and a `last_error` column
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
