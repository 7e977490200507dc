//! In-memory fakes for service tests

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inbox_common::StripeSignatureVerifier;
use inbox_core::traits::{
    AgentRepository, ClaimOptions, CompanyRepository, ConnectionRepository, ContactRepository,
    ContentGenerator, ConversationRepository, FollowUpRepository, GatewayReceipt,
    GenerationRequest, MediaSend, MessageRepository, MessagingGateway, ObjectStorage,
    ProfileRepository, ProviderResult, RealtimeEvent, RealtimePublisher, RepoResult,
    StoredObject, TextSend, WebhookLedger,
};
use inbox_core::{
    AiAgent, Company, ConnectionStatus, Contact, Conversation, ConversationStatus, DomainError,
    FollowUpQueueItem, FollowUpSequence, FollowUpStep, MemberRole, Message, PlanQuota, Profile,
    QueueStatus, SubscriptionStatus, WhatsAppConnection,
};
use parking_lot::Mutex;
use uuid::Uuid;

use super::context::{FollowUpSettings, ServiceContext};

pub const WEBHOOK_SECRET: &str = "whsec_test";

// ============================================================================
// Store
// ============================================================================

#[derive(Default)]
pub struct FakeStore {
    pub companies: Mutex<HashMap<Uuid, Company>>,
    pub profiles: Mutex<HashMap<Uuid, Profile>>,
    pub connections: Mutex<HashMap<Uuid, WhatsAppConnection>>,
    pub contacts: Mutex<HashMap<Uuid, Contact>>,
    pub conversations: Mutex<HashMap<Uuid, Conversation>>,
    pub messages: Mutex<Vec<Message>>,
    pub agents: Mutex<HashMap<Uuid, AiAgent>>,
    pub sequences: Mutex<HashMap<Uuid, FollowUpSequence>>,
    pub steps: Mutex<HashMap<Uuid, FollowUpStep>>,
    pub queue: Mutex<HashMap<Uuid, FollowUpQueueItem>>,
    /// When set, message delivery updates and conversation touches fail
    pub fail_writes: Mutex<Option<String>>,
    /// When set, another worker takes over every item right after it is claimed
    pub steal_claims: Mutex<bool>,
}

impl FakeStore {
    pub fn company(&self, id: Uuid) -> Option<Company> {
        self.companies.lock().get(&id).cloned()
    }

    pub fn profile(&self, user_id: Uuid) -> Option<Profile> {
        self.profiles.lock().get(&user_id).cloned()
    }

    pub fn conversation(&self, id: Uuid) -> Option<Conversation> {
        self.conversations.lock().get(&id).cloned()
    }

    pub fn queue_item(&self, id: Uuid) -> Option<FollowUpQueueItem> {
        self.queue.lock().get(&id).cloned()
    }

    pub fn messages_in(&self, conversation_id: Uuid) -> Vec<Message> {
        let mut messages: Vec<_> = self
            .messages
            .lock()
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        messages
    }

    pub fn insert_message(&self, message: Message) {
        self.messages.lock().push(message);
    }

    pub fn fail_writes(&self, message: &str) {
        *self.fail_writes.lock() = Some(message.to_string());
    }

    fn write_check(&self) -> RepoResult<()> {
        match self.fail_writes.lock().clone() {
            Some(message) => Err(DomainError::DatabaseError(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CompanyRepository for FakeStore {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Company>> {
        Ok(self.company(id))
    }

    async fn find_by_stripe_customer(&self, customer_id: &str) -> RepoResult<Option<Company>> {
        Ok(self
            .companies
            .lock()
            .values()
            .find(|c| c.stripe_customer_id.as_deref() == Some(customer_id))
            .cloned())
    }

    async fn update_billing(&self, company: &Company) -> RepoResult<()> {
        let mut companies = self.companies.lock();
        let slot = companies
            .get_mut(&company.id)
            .ok_or(DomainError::CompanyNotFound(company.id))?;
        *slot = company.clone();
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for FakeStore {
    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Option<Profile>> {
        Ok(self.profile(user_id))
    }
}

#[async_trait]
impl ConnectionRepository for FakeStore {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<WhatsAppConnection>> {
        Ok(self.connections.lock().get(&id).cloned())
    }
}

#[async_trait]
impl ContactRepository for FakeStore {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Contact>> {
        Ok(self.contacts.lock().get(&id).cloned())
    }
}

#[async_trait]
impl AgentRepository for FakeStore {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<AiAgent>> {
        Ok(self.agents.lock().get(&id).cloned())
    }
}

#[async_trait]
impl ConversationRepository for FakeStore {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Conversation>> {
        Ok(self.conversation(id))
    }

    async fn touch_last_message(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<()> {
        self.write_check()?;
        if let Some(conversation) = self.conversations.lock().get_mut(&id) {
            conversation.last_message_at = Some(conversation.last_message_at.map_or(at, |t| t.max(at)));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for FakeStore {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Message>> {
        Ok(self.messages.lock().iter().find(|m| m.id == id).cloned())
    }

    async fn create(&self, message: &Message) -> RepoResult<()> {
        self.insert_message(message.clone());
        Ok(())
    }

    async fn update_delivery(&self, message: &Message) -> RepoResult<()> {
        self.write_check()?;
        let mut messages = self.messages.lock();
        let slot = messages
            .iter_mut()
            .find(|m| m.id == message.id)
            .ok_or(DomainError::MessageNotFound(message.id))?;
        *slot = message.clone();
        Ok(())
    }

    async fn find_recent(&self, conversation_id: Uuid, limit: i64) -> RepoResult<Vec<Message>> {
        let messages = self.messages_in(conversation_id);
        let skip = messages.len().saturating_sub(limit.max(0) as usize);
        Ok(messages.into_iter().skip(skip).collect())
    }
}

#[async_trait]
impl FollowUpRepository for FakeStore {
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        options: ClaimOptions,
    ) -> RepoResult<Vec<FollowUpQueueItem>> {
        let mut queue = self.queue.lock();
        let mut due: Vec<_> = queue
            .values()
            .filter(|item| item.is_claimable(now))
            .map(|item| (item.scheduled_at, item.id))
            .collect();
        due.sort();

        let lease_token = Uuid::new_v4();
        let steal = *self.steal_claims.lock();
        let mut claimed = Vec::new();
        for (_, id) in due.into_iter().take(options.batch_size as usize) {
            if let Some(item) = queue.get_mut(&id) {
                item.status = QueueStatus::Processing;
                item.locked_until = Some(now + options.lease);
                item.lease_token = Some(lease_token);
                item.attempts += 1;
                claimed.push(item.clone());
                if steal {
                    item.lease_token = Some(Uuid::new_v4());
                    item.attempts += 1;
                }
            }
        }
        Ok(claimed)
    }

    async fn find_sequence(&self, id: Uuid) -> RepoResult<Option<FollowUpSequence>> {
        Ok(self.sequences.lock().get(&id).cloned())
    }

    async fn find_step(&self, id: Uuid) -> RepoResult<Option<FollowUpStep>> {
        Ok(self.steps.lock().get(&id).cloned())
    }

    async fn find_next_step(
        &self,
        sequence_id: Uuid,
        position: i32,
    ) -> RepoResult<Option<FollowUpStep>> {
        Ok(self
            .steps
            .lock()
            .values()
            .filter(|s| s.sequence_id == sequence_id && s.position > position)
            .min_by_key(|s| s.position)
            .cloned())
    }

    async fn enqueue(&self, item: &FollowUpQueueItem) -> RepoResult<()> {
        self.queue.lock().insert(item.id, item.clone());
        Ok(())
    }

    async fn renew_lease(
        &self,
        item: &FollowUpQueueItem,
        until: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut queue = self.queue.lock();
        match queue.get_mut(&item.id).filter(|held| held_by(held, item)) {
            Some(held) => {
                held.locked_until = Some(until);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn finish(
        &self,
        item: &FollowUpQueueItem,
        status: QueueStatus,
        error: Option<&str>,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut queue = self.queue.lock();
        let held = queue
            .get_mut(&item.id)
            .filter(|held| held_by(held, item))
            .ok_or(DomainError::QueueItemNotClaimable)?;
        held.status = status;
        held.last_error = error.map(str::to_string);
        held.processed_at = Some(at);
        held.locked_until = None;
        held.lease_token = None;
        Ok(())
    }

    async fn release(
        &self,
        item: &FollowUpQueueItem,
        scheduled_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut queue = self.queue.lock();
        let held = queue
            .get_mut(&item.id)
            .filter(|held| held_by(held, item))
            .ok_or(DomainError::QueueItemNotClaimable)?;
        held.status = QueueStatus::Pending;
        held.scheduled_at = scheduled_at;
        held.locked_until = None;
        held.lease_token = None;
        held.attempts = (held.attempts - 1).max(0);
        Ok(())
    }
}

/// Stored row is still processing under the claimant's lease
fn held_by(stored: &FollowUpQueueItem, claimed: &FollowUpQueueItem) -> bool {
    stored.status == QueueStatus::Processing
        && stored.lease_token.is_some()
        && stored.lease_token == claimed.lease_token
}

// ============================================================================
// Providers
// ============================================================================

#[derive(Default)]
pub struct FakeGateway {
    pub texts: Mutex<Vec<TextSend>>,
    pub media: Mutex<Vec<MediaSend>>,
    pub fail_with: Mutex<Option<String>>,
    /// Wall-clock time each send takes
    pub latency: Mutex<Option<std::time::Duration>>,
}

impl FakeGateway {
    pub fn fail(&self, message: &str) {
        *self.fail_with.lock() = Some(message.to_string());
    }

    fn outcome(&self, sent: usize) -> ProviderResult<GatewayReceipt> {
        if let Some(message) = self.fail_with.lock().clone() {
            return Err(DomainError::GatewayError(message));
        }
        Ok(GatewayReceipt {
            provider_message_id: Some(format!("WA-{sent}")),
        })
    }
}

#[async_trait]
impl MessagingGateway for FakeGateway {
    async fn send_text(&self, request: &TextSend) -> ProviderResult<GatewayReceipt> {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let sent = {
            let mut texts = self.texts.lock();
            texts.push(request.clone());
            texts.len()
        };
        self.outcome(sent)
    }

    async fn send_media(&self, request: &MediaSend) -> ProviderResult<GatewayReceipt> {
        let sent = {
            let mut media = self.media.lock();
            media.push(request.clone());
            media.len()
        };
        self.outcome(sent)
    }
}

pub struct FakeGenerator {
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub reply: Mutex<Result<String, String>>,
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply: Mutex::new(Ok("Oi! Posso ajudar em algo mais?".to_string())),
        }
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String> {
        self.requests.lock().push(request.clone());
        self.reply
            .lock()
            .clone()
            .map_err(DomainError::GenerationError)
    }
}

#[derive(Default)]
pub struct FakeStorage {
    /// (path, content type, size)
    pub uploads: Mutex<Vec<(String, String, usize)>>,
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ProviderResult<StoredObject> {
        self.uploads
            .lock()
            .push((path.to_string(), content_type.to_string(), bytes.len()));
        Ok(StoredObject {
            path: path.to_string(),
            public_url: format!("https://storage.test/public/{path}"),
        })
    }
}

#[derive(Default)]
pub struct FakePublisher {
    pub events: Mutex<Vec<RealtimeEvent>>,
    pub fail: Mutex<bool>,
}

#[async_trait]
impl RealtimePublisher for FakePublisher {
    async fn publish(&self, event: &RealtimeEvent) -> ProviderResult<()> {
        if *self.fail.lock() {
            return Err(DomainError::CacheError("redis unavailable".to_string()));
        }
        self.events.lock().push(event.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeLedger {
    pub seen: Mutex<HashSet<String>>,
}

#[async_trait]
impl WebhookLedger for FakeLedger {
    async fn record_once(&self, event_id: &str) -> ProviderResult<bool> {
        Ok(self.seen.lock().insert(event_id.to_string()))
    }

    async fn forget(&self, event_id: &str) -> ProviderResult<()> {
        self.seen.lock().remove(event_id);
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Ids of the rows created by [`Harness::seed`]
#[derive(Debug, Clone, Copy)]
pub struct Seed {
    pub company_id: Uuid,
    pub owner_id: Uuid,
    pub agent_id: Uuid,
    pub connection_id: Uuid,
    pub contact_id: Uuid,
    pub conversation_id: Uuid,
}

pub struct Harness {
    pub store: Arc<FakeStore>,
    pub gateway: Arc<FakeGateway>,
    pub generator: Arc<FakeGenerator>,
    pub storage: Arc<FakeStorage>,
    pub publisher: Arc<FakePublisher>,
    pub ledger: Arc<FakeLedger>,
    pub ctx: ServiceContext,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_plans(HashMap::new())
    }

    pub fn with_plans(price_plans: HashMap<String, PlanQuota>) -> Self {
        let store = Arc::new(FakeStore::default());
        let gateway = Arc::new(FakeGateway::default());
        let generator = Arc::new(FakeGenerator::default());
        let storage = Arc::new(FakeStorage::default());
        let publisher = Arc::new(FakePublisher::default());
        let ledger = Arc::new(FakeLedger::default());

        let ctx = ServiceContext::builder()
            .company_repo(store.clone())
            .profile_repo(store.clone())
            .connection_repo(store.clone())
            .contact_repo(store.clone())
            .conversation_repo(store.clone())
            .message_repo(store.clone())
            .agent_repo(store.clone())
            .follow_up_repo(store.clone())
            .gateway(gateway.clone())
            .generator(generator.clone())
            .storage(storage.clone())
            .publisher(publisher.clone())
            .webhook_ledger(ledger.clone())
            .stripe_verifier(StripeSignatureVerifier::new(WEBHOOK_SECRET, 300))
            .price_plans(price_plans)
            .follow_up_settings(FollowUpSettings::default())
            .build()
            .expect("harness context");

        Self {
            store,
            gateway,
            generator,
            storage,
            publisher,
            ledger,
            ctx,
        }
    }

    /// One company with an owner, an agent, a connected number and one open conversation
    pub fn seed(&self) -> Seed {
        let company_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();
        let agent_id = Uuid::new_v4();
        let connection_id = Uuid::new_v4();
        let contact_id = Uuid::new_v4();
        let conversation_id = Uuid::new_v4();

        self.store.companies.lock().insert(
            company_id,
            Company {
                id: company_id,
                name: "Loja Exemplo".to_string(),
                plan: "free".to_string(),
                subscription_status: SubscriptionStatus::Inactive,
                stripe_customer_id: None,
                stripe_subscription_id: None,
                max_connections: 1,
                max_users: 2,
                monthly_ai_credits: 100,
                current_period_end: None,
                updated_at: Utc::now(),
            },
        );

        for (user_id, role) in [(owner_id, MemberRole::Owner), (agent_id, MemberRole::Agent)] {
            self.store.profiles.lock().insert(
                user_id,
                Profile {
                    user_id,
                    company_id,
                    role,
                    full_name: None,
                },
            );
        }

        self.store.connections.lock().insert(
            connection_id,
            WhatsAppConnection {
                id: connection_id,
                company_id,
                name: "Comercial".to_string(),
                phone_number: Some("5511988880000".to_string()),
                instance_token: "instance-token".to_string(),
                status: ConnectionStatus::Connected,
            },
        );

        self.store.contacts.lock().insert(
            contact_id,
            Contact {
                id: contact_id,
                company_id,
                phone: "+55 (11) 99999-0000".to_string(),
                name: Some("Maria Silva".to_string()),
            },
        );

        self.store.conversations.lock().insert(
            conversation_id,
            Conversation {
                id: conversation_id,
                company_id,
                connection_id,
                contact_id,
                status: ConversationStatus::Open,
                last_message_at: None,
                last_inbound_at: None,
            },
        );

        Seed {
            company_id,
            owner_id,
            agent_id,
            connection_id,
            contact_id,
            conversation_id,
        }
    }
}
