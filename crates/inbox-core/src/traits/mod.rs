//! Ports implemented by the infrastructure crates

mod providers;
mod repositories;

pub use providers::{
    ContentGenerator, GatewayReceipt, GenerationRequest, MediaSend, MessagingGateway,
    ObjectStorage, PromptMessage, PromptRole, ProviderResult, RealtimeEvent, RealtimeEventKind,
    RealtimePublisher, StoredObject, TextSend, WebhookLedger,
};
pub use repositories::{
    AgentRepository, ClaimOptions, CompanyRepository, ConnectionRepository, ContactRepository,
    ConversationRepository, FollowUpRepository, MessageRepository, ProfileRepository, RepoResult,
};
