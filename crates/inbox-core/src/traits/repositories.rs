//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::entities::{
    AiAgent, Company, Contact, Conversation, FollowUpQueueItem, FollowUpSequence, FollowUpStep,
    Message, Profile, QueueStatus, WhatsAppConnection,
};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Company Repository
// ============================================================================

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Find company by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Company>>;

    /// Find company by its Stripe customer id
    async fn find_by_stripe_customer(&self, customer_id: &str) -> RepoResult<Option<Company>>;

    /// Persist plan, quota and subscription fields
    async fn update_billing(&self, company: &Company) -> RepoResult<()>;
}

// ============================================================================
// Profile Repository
// ============================================================================

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find the team profile of an authenticated user
    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Option<Profile>>;
}

// ============================================================================
// Connection / Contact / Agent Repositories
// ============================================================================

#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<WhatsAppConnection>>;
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Contact>>;
}

#[async_trait]
pub trait AgentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<AiAgent>>;
}

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Conversation>>;

    /// Move `last_message_at` forward after an outbound send
    async fn touch_last_message(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<()>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Message>>;

    /// Insert a new message
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Persist status, provider id, sent_at and error of a message
    async fn update_delivery(&self, message: &Message) -> RepoResult<()>;

    /// Latest messages of a conversation, oldest first
    async fn find_recent(&self, conversation_id: Uuid, limit: i64) -> RepoResult<Vec<Message>>;
}

// ============================================================================
// Follow-up Repository
// ============================================================================

/// Options for claiming due queue items
#[derive(Debug, Clone, Copy)]
pub struct ClaimOptions {
    pub batch_size: i64,
    /// How long a claim stays exclusive before another worker may take over
    pub lease: Duration,
}

impl Default for ClaimOptions {
    fn default() -> Self {
        Self {
            batch_size: 50,
            lease: Duration::minutes(5),
        }
    }
}

#[async_trait]
pub trait FollowUpRepository: Send + Sync {
    /// Atomically claim due items
    ///
    /// Selects pending items with `scheduled_at <= now` and processing items
    /// whose lease expired, skipping rows locked by another transaction, and
    /// moves them to `processing` with a fresh lease, a new lease token and an
    /// incremented attempt count. Concurrent callers never receive the same
    /// item while its lease is live.
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        options: ClaimOptions,
    ) -> RepoResult<Vec<FollowUpQueueItem>>;

    async fn find_sequence(&self, id: Uuid) -> RepoResult<Option<FollowUpSequence>>;

    async fn find_step(&self, id: Uuid) -> RepoResult<Option<FollowUpStep>>;

    /// Step following `position` in a sequence
    async fn find_next_step(
        &self,
        sequence_id: Uuid,
        position: i32,
    ) -> RepoResult<Option<FollowUpStep>>;

    /// Insert a new pending item
    async fn enqueue(&self, item: &FollowUpQueueItem) -> RepoResult<()>;

    /// Extend a claimed item's lease to `until`
    ///
    /// Returns `false` when the item was reclaimed by someone else or is no
    /// longer processing; the caller must then leave it alone.
    async fn renew_lease(&self, item: &FollowUpQueueItem, until: DateTime<Utc>)
        -> RepoResult<bool>;

    /// Move a claimed item to a terminal status
    ///
    /// Fails with `QueueItemNotClaimable` unless `item` still holds the lease.
    async fn finish(
        &self,
        item: &FollowUpQueueItem,
        status: QueueStatus,
        error: Option<&str>,
        at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Return a claimed item to `pending` at a later time without
    /// consuming an attempt
    async fn release(&self, item: &FollowUpQueueItem, scheduled_at: DateTime<Utc>)
        -> RepoResult<()>;
}
