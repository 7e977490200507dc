//! Infrastructure wiring shared by the API server and the worker
//!
//! Connects to PostgreSQL and Redis, builds the HTTP adapters and assembles
//! a [`ServiceContext`] from an [`AppConfig`].

use std::path::Path;
use std::sync::Arc;

use inbox_cache::{Publisher, RedisPool, RedisPoolConfig, WebhookLedgerStore};
use inbox_common::{AppConfig, AppError, StripeSignatureVerifier};
use inbox_db::{
    create_pool, run_migrations, PgAgentRepository, PgCompanyRepository, PgConnectionRepository,
    PgContactRepository, PgConversationRepository, PgFollowUpRepository, PgMessageRepository,
    PgPool, PgProfileRepository, PoolConfig,
};
use inbox_providers::{GeminiClient, SupabaseStorage, UazapiClient};
use tracing::info;

use crate::services::{FollowUpSettings, ServiceContext};

/// Connection pools owned by a running process
#[derive(Debug, Clone)]
pub struct Infrastructure {
    pub pg_pool: PgPool,
    pub redis_pool: RedisPool,
}

impl Infrastructure {
    /// Open the PostgreSQL and Redis pools
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pg_pool = create_pool(&PoolConfig::from(&config.database))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        info!("PostgreSQL connection established");

        info!("Connecting to Redis...");
        let redis_pool = RedisPool::new(RedisPoolConfig::from(&config.redis))
            .map_err(|e| AppError::Cache(e.to_string()))?;
        redis_pool
            .health_check()
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;
        info!("Redis connection established");

        Ok(Self {
            pg_pool,
            redis_pool,
        })
    }

    /// Apply the SQL migrations in `dir`
    pub async fn migrate(&self, dir: impl AsRef<Path>) -> Result<(), AppError> {
        run_migrations(&self.pg_pool, dir)
            .await
            .map_err(|e| AppError::Database(format!("migration failed: {e}")))
    }

    /// Build the service context on top of these pools
    pub fn service_context(&self, config: &AppConfig) -> Result<ServiceContext, AppError> {
        let pool = &self.pg_pool;

        let gateway = UazapiClient::new(&config.uazapi).map_err(config_error)?;
        let generator = GeminiClient::new(&config.gemini).map_err(config_error)?;
        let storage = SupabaseStorage::new(&config.supabase).map_err(config_error)?;

        let context = ServiceContext::builder()
            .company_repo(Arc::new(PgCompanyRepository::new(pool.clone())))
            .profile_repo(Arc::new(PgProfileRepository::new(pool.clone())))
            .connection_repo(Arc::new(PgConnectionRepository::new(pool.clone())))
            .contact_repo(Arc::new(PgContactRepository::new(pool.clone())))
            .conversation_repo(Arc::new(PgConversationRepository::new(pool.clone())))
            .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
            .agent_repo(Arc::new(PgAgentRepository::new(pool.clone())))
            .follow_up_repo(Arc::new(PgFollowUpRepository::new(pool.clone())))
            .gateway(Arc::new(gateway))
            .generator(Arc::new(generator))
            .storage(Arc::new(storage))
            .publisher(Arc::new(Publisher::new(self.redis_pool.clone())))
            .webhook_ledger(Arc::new(WebhookLedgerStore::new(
                self.redis_pool.clone(),
                config.stripe.event_ttl_secs,
            )))
            .stripe_verifier(StripeSignatureVerifier::new(
                &config.stripe.webhook_secret,
                config.stripe.tolerance_secs,
            ))
            .price_plans(config.stripe.price_plans.clone())
            .follow_up_settings(FollowUpSettings::from(&config.follow_up))
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        info!(
            price_plans = config.stripe.price_plans.len(),
            "Service context ready"
        );
        Ok(context)
    }
}

fn config_error(e: inbox_providers::ProviderError) -> AppError {
    AppError::Config(e.to_string())
}
