//! Test fixtures and data generators
//!
//! Rows are inserted straight into PostgreSQL; every tenant gets fresh ids
//! so tests can share one database.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use inbox_common::StripeSignatureVerifier;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::helpers::WEBHOOK_SECRET;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A company with one user, one connected instance and one open conversation
#[derive(Debug, Clone)]
pub struct Tenant {
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub connection_id: Uuid,
    pub instance_token: String,
    pub contact_id: Uuid,
    pub contact_phone: String,
    pub conversation_id: Uuid,
}

impl Tenant {
    /// Seed a tenant whose user has `role`
    pub async fn seed(pool: &PgPool, role: &str) -> Result<Self> {
        let suffix = unique_suffix();
        let tenant = Self {
            company_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            instance_token: format!("instance-{}", Uuid::new_v4().simple()),
            contact_id: Uuid::new_v4(),
            contact_phone: format!("5511{:09}", Uuid::new_v4().as_u128() % 1_000_000_000),
            conversation_id: Uuid::new_v4(),
        };

        sqlx::query("INSERT INTO companies (id, name) VALUES ($1, $2)")
            .bind(tenant.company_id)
            .bind(format!("Company {suffix}"))
            .execute(pool)
            .await?;

        sqlx::query("INSERT INTO profiles (id, company_id, role, full_name) VALUES ($1, $2, $3, $4)")
            .bind(tenant.user_id)
            .bind(tenant.company_id)
            .bind(role)
            .bind(format!("Agent {suffix}"))
            .execute(pool)
            .await?;

        sqlx::query(
            "INSERT INTO whatsapp_connections (id, company_id, name, instance_token, status) \
             VALUES ($1, $2, $3, $4, 'connected')",
        )
        .bind(tenant.connection_id)
        .bind(tenant.company_id)
        .bind(format!("Line {suffix}"))
        .bind(&tenant.instance_token)
        .execute(pool)
        .await?;

        sqlx::query("INSERT INTO contacts (id, company_id, phone, name) VALUES ($1, $2, $3, $4)")
            .bind(tenant.contact_id)
            .bind(tenant.company_id)
            .bind(&tenant.contact_phone)
            .bind("Maria Silva")
            .execute(pool)
            .await?;

        insert_conversation(pool, &tenant, tenant.conversation_id).await?;

        Ok(tenant)
    }

    /// Another conversation with the same contact and connection
    pub async fn add_conversation(&self, pool: &PgPool) -> Result<Uuid> {
        let id = Uuid::new_v4();
        insert_conversation(pool, self, id).await?;
        Ok(id)
    }

    pub async fn set_connection_status(&self, pool: &PgPool, status: &str) -> Result<()> {
        sqlx::query("UPDATE whatsapp_connections SET status = $2 WHERE id = $1")
            .bind(self.connection_id)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a message from the contact
    pub async fn insert_inbound(
        &self,
        pool: &PgPool,
        conversation_id: Uuid,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO messages \
             (id, company_id, conversation_id, direction, message_type, content, status, \
              provider_message_id, created_at) \
             VALUES ($1, $2, $3, 'inbound', 'text', $4, 'delivered', $5, $6)",
        )
        .bind(id)
        .bind(self.company_id)
        .bind(conversation_id)
        .bind(content)
        .bind(format!("WA-{}", id.simple()))
        .bind(at)
        .execute(pool)
        .await?;
        Ok(id)
    }
}

async fn insert_conversation(pool: &PgPool, tenant: &Tenant, id: Uuid) -> Result<()> {
    sqlx::query(
        "INSERT INTO conversations (id, company_id, connection_id, contact_id) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind(tenant.company_id)
    .bind(tenant.connection_id)
    .bind(tenant.contact_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Two-step template sequence; the second step waits an hour
#[derive(Debug, Clone)]
pub struct Sequence {
    pub id: Uuid,
    pub first_step: Uuid,
    pub second_step: Uuid,
}

impl Sequence {
    pub async fn seed(pool: &PgPool, tenant: &Tenant) -> Result<Self> {
        let sequence = Self {
            id: Uuid::new_v4(),
            first_step: Uuid::new_v4(),
            second_step: Uuid::new_v4(),
        };

        sqlx::query(
            "INSERT INTO followup_sequences (id, company_id, name, is_active, stop_on_reply) \
             VALUES ($1, $2, 'Reengajamento', TRUE, TRUE)",
        )
        .bind(sequence.id)
        .bind(tenant.company_id)
        .execute(pool)
        .await?;

        for (id, position, delay, content) in [
            (sequence.first_step, 1, 0, "Oi {{first_name}}, posso ajudar?"),
            (sequence.second_step, 2, 60, "Ainda por aqui, {{first_name}}"),
        ] {
            sqlx::query(
                "INSERT INTO followup_steps (id, sequence_id, position, delay_minutes, content_type, content) \
                 VALUES ($1, $2, $3, $4, 'template', $5)",
            )
            .bind(id)
            .bind(sequence.id)
            .bind(position)
            .bind(delay)
            .bind(content)
            .execute(pool)
            .await?;
        }

        Ok(sequence)
    }

    /// Queue the first step for a conversation, due a minute ago and enrolled two hours ago
    pub async fn enqueue(&self, pool: &PgPool, tenant: &Tenant, conversation_id: Uuid) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO followup_queue \
             (id, company_id, sequence_id, step_id, conversation_id, scheduled_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(tenant.company_id)
        .bind(self.id)
        .bind(self.first_step)
        .bind(conversation_id)
        .bind(now - Duration::minutes(1))
        .bind(now - Duration::hours(2))
        .execute(pool)
        .await?;
        Ok(id)
    }
}

/// Status of a queue row
pub async fn queue_status(pool: &PgPool, id: Uuid) -> Result<String> {
    Ok(sqlx::query_scalar("SELECT status FROM followup_queue WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?)
}

/// Status of a message row
pub async fn message_status(pool: &PgPool, id: Uuid) -> Result<String> {
    Ok(sqlx::query_scalar("SELECT status FROM messages WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?)
}

/// Billing columns of a company: (plan, subscription_status, stripe_customer_id, max_connections)
pub async fn company_billing(
    pool: &PgPool,
    id: Uuid,
) -> Result<(String, String, Option<String>, i32)> {
    Ok(sqlx::query_as(
        "SELECT plan, subscription_status, stripe_customer_id, max_connections \
         FROM companies WHERE id = $1",
    )
    .bind(id)
    .fetch_one(pool)
    .await?)
}

/// A Stripe event envelope around `object`
pub fn stripe_event(event_type: &str, object: Value) -> Value {
    json!({
        "id": format!("evt_{}", Uuid::new_v4().simple()),
        "type": event_type,
        "data": {"object": object}
    })
}

/// Serialize and sign an event with the test webhook secret
pub fn signed_event(event: &Value) -> Result<(Vec<u8>, String)> {
    let payload = serde_json::to_vec(event)?;
    let signature = StripeSignatureVerifier::new(WEBHOOK_SECRET, 300)
        .sign(&payload, Utc::now().timestamp())?;
    Ok((payload, signature))
}

/// A tiny base64 PNG payload
pub fn png_base64() -> &'static str {
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg=="
}
