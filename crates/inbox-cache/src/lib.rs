//! # inbox-cache
//!
//! Redis layer for realtime fan-out and webhook idempotency.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pub/Sub**: Inbox events published to company and conversation channels
//! - **Idempotency**: Processed Stripe event ids with a TTL
//!
//! ## Example
//!
//! ```ignore
//! use inbox_cache::{Publisher, RedisPool, RedisPoolConfig, WebhookLedgerStore};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = Publisher::new(pool.clone());
//! let ledger = WebhookLedgerStore::new(pool, 86_400);
//!
//! if ledger.record_once("evt_123").await? {
//!     // first delivery
//! }
//! ```

pub mod idempotency;
pub mod pool;
pub mod pubsub;

pub use idempotency::{WebhookLedgerStore, STRIPE_EVENT_PREFIX};
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use pubsub::{
    PubSubChannel, PubSubEvent, Publisher, COMPANY_CHANNEL_PREFIX, CONVERSATION_CHANNEL_PREFIX,
};
