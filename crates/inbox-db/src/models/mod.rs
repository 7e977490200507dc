//! Database models - SQLx-compatible structs for PostgreSQL tables

mod company;
mod conversation;
mod follow_up;
mod message;

pub use company::{CompanyModel, ProfileModel};
pub use conversation::{AgentModel, ConnectionModel, ContactModel, ConversationModel};
pub use follow_up::{QueueItemModel, SequenceModel, StepModel};
pub use message::MessageModel;
