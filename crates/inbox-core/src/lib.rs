//! # inbox-core
//!
//! Domain layer containing entities, value objects, repository traits and provider ports.
//! This crate has zero dependencies on infrastructure (database, web framework, HTTP clients).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    render_template, AiAgent, Company, ConnectionStatus, Contact, Conversation,
    ConversationStatus, FollowUpQueueItem, FollowUpSequence, FollowUpStep, MemberRole, Message,
    MessageDirection, MessageStatus, MessageType, Profile, QueueStatus, StepContent,
    SubscriptionStatus, WhatsAppConnection,
};
pub use error::DomainError;
pub use traits::{
    AgentRepository, ClaimOptions, CompanyRepository, ConnectionRepository, ContactRepository,
    ContentGenerator, ConversationRepository, FollowUpRepository, GatewayReceipt,
    GenerationRequest, MediaSend, MessageRepository, MessagingGateway, ObjectStorage,
    ProfileRepository, PromptMessage, PromptRole, ProviderResult, RealtimeEvent,
    RealtimeEventKind, RealtimePublisher, RepoResult, StoredObject, TextSend, WebhookLedger,
};
pub use value_objects::{
    media_object_path, MediaKind, OperatingHours, Permissions, PhoneNumber, PlanQuota,
};
