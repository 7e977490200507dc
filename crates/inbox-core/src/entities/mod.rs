//! Domain entities - core business objects

mod agent;
mod company;
mod connection;
mod contact;
mod conversation;
mod follow_up;
mod message;
mod profile;
mod template;

pub use agent::AiAgent;
pub use company::{Company, SubscriptionStatus};
pub use connection::{ConnectionStatus, WhatsAppConnection};
pub use contact::Contact;
pub use conversation::{Conversation, ConversationStatus};
pub use follow_up::{FollowUpQueueItem, FollowUpSequence, FollowUpStep, QueueStatus, StepContent};
pub use message::{Message, MessageDirection, MessageStatus, MessageType};
pub use profile::{MemberRole, Profile};
pub use template::render_template;
