//! # inbox-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for the repository traits
//! defined in `inbox-core`. It handles:
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations, including the leased follow-up queue claim
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inbox_db::{create_pool, PoolConfig, PgFollowUpRepository};
//! use inbox_core::traits::{ClaimOptions, FollowUpRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::default()).await?;
//!     let queue = PgFollowUpRepository::new(pool);
//!     let due = queue.claim_due(chrono::Utc::now(), ClaimOptions::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgAgentRepository, PgCompanyRepository, PgConnectionRepository, PgContactRepository,
    PgConversationRepository, PgFollowUpRepository, PgMessageRepository, PgProfileRepository,
};
