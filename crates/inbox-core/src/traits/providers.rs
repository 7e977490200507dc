//! Provider traits (ports) for external services
//!
//! Adapters live in `inbox-providers` (HTTP) and `inbox-cache` (Redis).

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::DomainError;
use crate::value_objects::MediaKind;

/// Result type for provider calls
pub type ProviderResult<T> = Result<T, DomainError>;

// ============================================================================
// Messaging Gateway
// ============================================================================

/// Plain text send
#[derive(Debug, Clone)]
pub struct TextSend {
    /// Per-connection instance token
    pub token: String,
    /// Digits-only recipient
    pub number: String,
    pub text: String,
    /// Provider id of the message being replied to
    pub reply_to: Option<String>,
}

/// Media send referencing an uploaded object
#[derive(Debug, Clone)]
pub struct MediaSend {
    pub token: String,
    pub number: String,
    pub kind: MediaKind,
    /// Public URL of the uploaded file
    pub file_url: String,
    pub caption: Option<String>,
    pub reply_to: Option<String>,
}

/// What the gateway returned for an accepted send
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayReceipt {
    pub provider_message_id: Option<String>,
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_text(&self, request: &TextSend) -> ProviderResult<GatewayReceipt>;

    async fn send_media(&self, request: &MediaSend) -> ProviderResult<GatewayReceipt>;
}

// ============================================================================
// Content Generator (LLM)
// ============================================================================

/// Speaker of a prompt turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    User,
    Model,
}

/// One turn of conversation history handed to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub text: String,
}

impl PromptMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub messages: Vec<PromptMessage>,
    /// Overrides the configured default model
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate one reply; returns the concatenated text parts
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String>;
}

// ============================================================================
// Object Storage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: String,
    pub public_url: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ProviderResult<StoredObject>;
}

// ============================================================================
// Realtime Publisher
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RealtimeEventKind {
    MessageCreate,
    MessageUpdate,
    FollowUpSent,
}

impl RealtimeEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::MessageUpdate => "MESSAGE_UPDATE",
            Self::FollowUpSent => "FOLLOW_UP_SENT",
        }
    }
}

/// Event fanned out to the company and conversation channels
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeEvent {
    #[serde(rename = "t")]
    pub kind: RealtimeEventKind,
    #[serde(skip)]
    pub company_id: Uuid,
    #[serde(skip)]
    pub conversation_id: Uuid,
    #[serde(rename = "d")]
    pub data: serde_json::Value,
}

#[async_trait]
pub trait RealtimePublisher: Send + Sync {
    async fn publish(&self, event: &RealtimeEvent) -> ProviderResult<()>;
}

// ============================================================================
// Webhook Ledger
// ============================================================================

#[async_trait]
pub trait WebhookLedger: Send + Sync {
    /// Record an event id; `false` when it was already recorded
    async fn record_once(&self, event_id: &str) -> ProviderResult<bool>;

    /// Drop a record so a provider retry is processed again
    async fn forget(&self, event_id: &str) -> ProviderResult<()>;
}
