//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use inbox_core::entities::Message;
use inbox_core::error::DomainError;
use inbox_core::traits::{MessageRepository, RepoResult};

use crate::mappers::MessageInsert;
use crate::models::MessageModel;

use super::error::{map_db_error, map_foreign_key_violation};

const MESSAGE_COLUMNS: &str = r#"
    id, company_id, conversation_id, direction, message_type, content, media_url, media_mime,
    status, provider_message_id, reply_to_id, sender_id, error_message, created_at, sent_at
"#;

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        let insert = MessageInsert::new(message);

        sqlx::query(
            r#"
            INSERT INTO messages (
                id, company_id, conversation_id, direction, message_type, content, media_url,
                media_mime, status, provider_message_id, reply_to_id, sender_id, error_message,
                created_at, sent_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(insert.id)
        .bind(insert.company_id)
        .bind(insert.conversation_id)
        .bind(insert.direction)
        .bind(insert.message_type)
        .bind(insert.content)
        .bind(insert.media_url)
        .bind(insert.media_mime)
        .bind(insert.status)
        .bind(insert.provider_message_id)
        .bind(insert.reply_to_id)
        .bind(insert.sender_id)
        .bind(insert.error_message)
        .bind(insert.created_at)
        .bind(insert.sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_foreign_key_violation(e, || {
                DomainError::ConversationNotFound(message.conversation_id)
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, status = message.status.as_str()))]
    async fn update_delivery(&self, message: &Message) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET status = $2, provider_message_id = $3, sent_at = $4, error_message = $5
            WHERE id = $1
            "#,
        )
        .bind(message.id)
        .bind(message.status.as_str())
        .bind(&message.provider_message_id)
        .bind(message.sent_at)
        .bind(&message.error_message)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MessageNotFound(message.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_recent(&self, conversation_id: Uuid, limit: i64) -> RepoResult<Vec<Message>> {
        let limit = limit.clamp(1, 100);

        let mut results = sqlx::query_as::<_, MessageModel>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.reverse();
        Ok(results.into_iter().map(Message::from).collect())
    }
}
