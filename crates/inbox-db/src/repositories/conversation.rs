//! PostgreSQL repositories for connections, contacts, conversations and agents

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use inbox_core::entities::{AiAgent, Contact, Conversation, WhatsAppConnection};
use inbox_core::error::DomainError;
use inbox_core::traits::{
    AgentRepository, ConnectionRepository, ContactRepository, ConversationRepository, RepoResult,
};

use crate::models::{AgentModel, ConnectionModel, ContactModel, ConversationModel};

use super::error::map_db_error;

/// PostgreSQL implementation of ConnectionRepository
#[derive(Clone)]
pub struct PgConnectionRepository {
    pool: PgPool,
}

impl PgConnectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionRepository for PgConnectionRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<WhatsAppConnection>> {
        let result = sqlx::query_as::<_, ConnectionModel>(
            r#"
            SELECT id, company_id, name, phone_number, instance_token, status
            FROM whatsapp_connections
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(WhatsAppConnection::from))
    }
}

/// PostgreSQL implementation of ContactRepository
#[derive(Clone)]
pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Contact>> {
        let result = sqlx::query_as::<_, ContactModel>(
            "SELECT id, company_id, phone, name FROM contacts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Contact::from))
    }
}

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, company_id, connection_id, contact_id, status, last_message_at, last_inbound_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn touch_last_message(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<()> {
        // Never move the marker backwards when sends finish out of order
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_at = GREATEST(COALESCE(last_message_at, $2), $2)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ConversationNotFound(id));
        }

        Ok(())
    }
}

/// PostgreSQL implementation of AgentRepository
#[derive(Clone)]
pub struct PgAgentRepository {
    pool: PgPool,
}

impl PgAgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentRepository for PgAgentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<AiAgent>> {
        let result = sqlx::query_as::<_, AgentModel>(
            r#"
            SELECT id, company_id, name, persona, rules, knowledge, model, temperature
            FROM ai_agents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(AiAgent::from))
    }
}
