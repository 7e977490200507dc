//! Service context - dependency container for services
//!
//! Holds the repositories, provider ports and settings the use cases need.
//! Everything is behind a trait object so tests can swap in fakes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use inbox_common::{FollowUpConfig, StripeSignatureVerifier};
use inbox_core::traits::{
    AgentRepository, ClaimOptions, CompanyRepository, ConnectionRepository, ContactRepository,
    ContentGenerator, ConversationRepository, FollowUpRepository, MessageRepository,
    MessagingGateway, ObjectStorage, ProfileRepository, RealtimePublisher, WebhookLedger,
};
use inbox_core::PlanQuota;

use super::error::{ServiceError, ServiceResult};

/// Follow-up processor tuning
#[derive(Debug, Clone, Copy)]
pub struct FollowUpSettings {
    pub batch_size: i64,
    pub lease: Duration,
    pub max_attempts: i32,
    /// Messages of history included in AI prompts
    pub history_limit: i64,
}

impl Default for FollowUpSettings {
    fn default() -> Self {
        Self {
            batch_size: 50,
            lease: Duration::minutes(5),
            max_attempts: 3,
            history_limit: 20,
        }
    }
}

impl FollowUpSettings {
    pub fn claim_options(&self) -> ClaimOptions {
        ClaimOptions {
            batch_size: self.batch_size,
            lease: self.lease,
        }
    }
}

impl From<&FollowUpConfig> for FollowUpSettings {
    fn from(config: &FollowUpConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            lease: Duration::seconds(config.lease_secs),
            max_attempts: config.max_attempts,
            history_limit: config.history_limit,
        }
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    company_repo: Arc<dyn CompanyRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    connection_repo: Arc<dyn ConnectionRepository>,
    contact_repo: Arc<dyn ContactRepository>,
    conversation_repo: Arc<dyn ConversationRepository>,
    message_repo: Arc<dyn MessageRepository>,
    agent_repo: Arc<dyn AgentRepository>,
    follow_up_repo: Arc<dyn FollowUpRepository>,

    // Providers
    gateway: Arc<dyn MessagingGateway>,
    generator: Arc<dyn ContentGenerator>,
    storage: Arc<dyn ObjectStorage>,
    publisher: Arc<dyn RealtimePublisher>,
    webhook_ledger: Arc<dyn WebhookLedger>,

    // Settings
    stripe_verifier: StripeSignatureVerifier,
    price_plans: Arc<HashMap<String, PlanQuota>>,
    follow_up: FollowUpSettings,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn company_repo(&self) -> &dyn CompanyRepository {
        self.company_repo.as_ref()
    }

    pub fn profile_repo(&self) -> &dyn ProfileRepository {
        self.profile_repo.as_ref()
    }

    pub fn connection_repo(&self) -> &dyn ConnectionRepository {
        self.connection_repo.as_ref()
    }

    pub fn contact_repo(&self) -> &dyn ContactRepository {
        self.contact_repo.as_ref()
    }

    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn agent_repo(&self) -> &dyn AgentRepository {
        self.agent_repo.as_ref()
    }

    pub fn follow_up_repo(&self) -> &dyn FollowUpRepository {
        self.follow_up_repo.as_ref()
    }

    // === Providers ===

    pub fn gateway(&self) -> &dyn MessagingGateway {
        self.gateway.as_ref()
    }

    pub fn generator(&self) -> &dyn ContentGenerator {
        self.generator.as_ref()
    }

    pub fn storage(&self) -> &dyn ObjectStorage {
        self.storage.as_ref()
    }

    pub fn publisher(&self) -> &dyn RealtimePublisher {
        self.publisher.as_ref()
    }

    pub fn webhook_ledger(&self) -> &dyn WebhookLedger {
        self.webhook_ledger.as_ref()
    }

    // === Settings ===

    pub fn stripe_verifier(&self) -> &StripeSignatureVerifier {
        &self.stripe_verifier
    }

    /// Plan quota for a Stripe price id
    pub fn plan_for_price(&self, price_id: &str) -> Option<&PlanQuota> {
        self.price_plans.get(price_id)
    }

    pub fn follow_up_settings(&self) -> &FollowUpSettings {
        &self.follow_up
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("providers", &"...")
            .field("price_plans", &self.price_plans.len())
            .field("follow_up", &self.follow_up)
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    company_repo: Option<Arc<dyn CompanyRepository>>,
    profile_repo: Option<Arc<dyn ProfileRepository>>,
    connection_repo: Option<Arc<dyn ConnectionRepository>>,
    contact_repo: Option<Arc<dyn ContactRepository>>,
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    agent_repo: Option<Arc<dyn AgentRepository>>,
    follow_up_repo: Option<Arc<dyn FollowUpRepository>>,
    gateway: Option<Arc<dyn MessagingGateway>>,
    generator: Option<Arc<dyn ContentGenerator>>,
    storage: Option<Arc<dyn ObjectStorage>>,
    publisher: Option<Arc<dyn RealtimePublisher>>,
    webhook_ledger: Option<Arc<dyn WebhookLedger>>,
    stripe_verifier: Option<StripeSignatureVerifier>,
    price_plans: HashMap<String, PlanQuota>,
    follow_up: FollowUpSettings,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn company_repo(mut self, repo: Arc<dyn CompanyRepository>) -> Self {
        self.company_repo = Some(repo);
        self
    }

    pub fn profile_repo(mut self, repo: Arc<dyn ProfileRepository>) -> Self {
        self.profile_repo = Some(repo);
        self
    }

    pub fn connection_repo(mut self, repo: Arc<dyn ConnectionRepository>) -> Self {
        self.connection_repo = Some(repo);
        self
    }

    pub fn contact_repo(mut self, repo: Arc<dyn ContactRepository>) -> Self {
        self.contact_repo = Some(repo);
        self
    }

    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn agent_repo(mut self, repo: Arc<dyn AgentRepository>) -> Self {
        self.agent_repo = Some(repo);
        self
    }

    pub fn follow_up_repo(mut self, repo: Arc<dyn FollowUpRepository>) -> Self {
        self.follow_up_repo = Some(repo);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn MessagingGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn RealtimePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn webhook_ledger(mut self, ledger: Arc<dyn WebhookLedger>) -> Self {
        self.webhook_ledger = Some(ledger);
        self
    }

    pub fn stripe_verifier(mut self, verifier: StripeSignatureVerifier) -> Self {
        self.stripe_verifier = Some(verifier);
        self
    }

    pub fn price_plans(mut self, plans: HashMap<String, PlanQuota>) -> Self {
        self.price_plans = plans;
        self
    }

    pub fn follow_up_settings(mut self, settings: FollowUpSettings) -> Self {
        self.follow_up = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::internal(format!("{name} is required")))
        }

        Ok(ServiceContext {
            company_repo: required(self.company_repo, "company_repo")?,
            profile_repo: required(self.profile_repo, "profile_repo")?,
            connection_repo: required(self.connection_repo, "connection_repo")?,
            contact_repo: required(self.contact_repo, "contact_repo")?,
            conversation_repo: required(self.conversation_repo, "conversation_repo")?,
            message_repo: required(self.message_repo, "message_repo")?,
            agent_repo: required(self.agent_repo, "agent_repo")?,
            follow_up_repo: required(self.follow_up_repo, "follow_up_repo")?,
            gateway: required(self.gateway, "gateway")?,
            generator: required(self.generator, "generator")?,
            storage: required(self.storage, "storage")?,
            publisher: required(self.publisher, "publisher")?,
            webhook_ledger: required(self.webhook_ledger, "webhook_ledger")?,
            stripe_verifier: required(self.stripe_verifier, "stripe_verifier")?,
            price_plans: Arc::new(self.price_plans),
            follow_up: self.follow_up,
        })
    }
}
