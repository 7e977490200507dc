//! Entity to model mappers
//!
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database operations

mod company;
mod conversation;
mod follow_up;
mod message;

pub use follow_up::{step_content_parts, QueueItemInsert};
pub use message::MessageInsert;
