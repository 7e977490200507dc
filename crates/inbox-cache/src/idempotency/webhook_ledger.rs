//! Processed-event ledger backed by `SET NX EX`.
//!
//! Stripe delivers at least once; an event id recorded here is acknowledged
//! without being applied again until the record expires.

use async_trait::async_trait;
use inbox_core::{DomainError, ProviderResult, WebhookLedger};

use crate::pool::RedisPool;

/// Key prefix for Stripe event ids
pub const STRIPE_EVENT_PREFIX: &str = "stripe:event:";

#[derive(Clone)]
pub struct WebhookLedgerStore {
    pool: RedisPool,
    prefix: &'static str,
    ttl_seconds: u64,
}

impl WebhookLedgerStore {
    #[must_use]
    pub fn new(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self {
            pool,
            prefix: STRIPE_EVENT_PREFIX,
            ttl_seconds,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = prefix;
        self
    }

    fn key(&self, event_id: &str) -> String {
        format!("{}{event_id}", self.prefix)
    }
}

#[async_trait]
impl WebhookLedger for WebhookLedgerStore {
    async fn record_once(&self, event_id: &str) -> ProviderResult<bool> {
        let created = self
            .pool
            .set_if_absent(&self.key(event_id), "1", self.ttl_seconds)
            .await
            .map_err(DomainError::from)?;

        if !created {
            tracing::debug!(event_id, "Webhook event already recorded");
        }
        Ok(created)
    }

    async fn forget(&self, event_id: &str) -> ProviderResult<()> {
        self.pool
            .delete(&self.key(event_id))
            .await
            .map(|_| ())
            .map_err(DomainError::from)
    }
}
