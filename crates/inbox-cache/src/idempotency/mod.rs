//! Idempotency records for provider webhooks.

mod webhook_ledger;

pub use webhook_ledger::{WebhookLedgerStore, STRIPE_EVENT_PREFIX};
