//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in inbox-core.

mod company;
mod conversation;
mod error;
mod follow_up;
mod message;

pub use company::{PgCompanyRepository, PgProfileRepository};
pub use conversation::{
    PgAgentRepository, PgConnectionRepository, PgContactRepository, PgConversationRepository,
};
pub use follow_up::PgFollowUpRepository;
pub use message::PgMessageRepository;
