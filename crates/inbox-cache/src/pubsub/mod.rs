//! Redis Pub/Sub module.
//!
//! Fans realtime inbox events out to company and conversation channels.

mod channels;
mod publisher;

pub use channels::{PubSubChannel, COMPANY_CHANNEL_PREFIX, CONVERSATION_CHANNEL_PREFIX};
pub use publisher::{PubSubEvent, Publisher};
