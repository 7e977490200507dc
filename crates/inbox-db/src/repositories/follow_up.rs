//! PostgreSQL implementation of FollowUpRepository
//!
//! Claims use `FOR UPDATE SKIP LOCKED` plus a lease column so that concurrent
//! workers (the HTTP trigger and the worker binary) never send the same item
//! twice, and items held by a crashed worker come back once the lease ends.
//! Every claim writes a new `lease_token`; renewing and settling match on it,
//! so a worker whose lease ran out cannot touch an item someone else holds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use inbox_core::entities::{FollowUpQueueItem, FollowUpSequence, FollowUpStep, QueueStatus};
use inbox_core::error::DomainError;
use inbox_core::traits::{ClaimOptions, FollowUpRepository, RepoResult};

use crate::mappers::QueueItemInsert;
use crate::models::{QueueItemModel, SequenceModel, StepModel};

use super::error::{map_db_error, map_foreign_key_violation};

/// PostgreSQL implementation of FollowUpRepository
#[derive(Clone)]
pub struct PgFollowUpRepository {
    pool: PgPool,
}

impl PgFollowUpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowUpRepository for PgFollowUpRepository {
    #[instrument(skip(self))]
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        options: ClaimOptions,
    ) -> RepoResult<Vec<FollowUpQueueItem>> {
        let locked_until = now + options.lease;
        let lease_token = Uuid::new_v4();

        let mut results = sqlx::query_as::<_, QueueItemModel>(
            r#"
            WITH due AS (
                SELECT id
                FROM followup_queue
                WHERE (status = 'pending' AND scheduled_at <= $1)
                   OR (status = 'processing' AND locked_until < $1)
                ORDER BY scheduled_at
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            UPDATE followup_queue q
            SET status = 'processing',
                locked_until = $3,
                lease_token = $4,
                attempts = q.attempts + 1
            FROM due
            WHERE q.id = due.id
            RETURNING q.id, q.company_id, q.sequence_id, q.step_id, q.conversation_id, q.status,
                      q.scheduled_at, q.attempts, q.locked_until, q.lease_token, q.last_error,
                      q.created_at, q.processed_at
            "#,
        )
        .bind(now)
        .bind(options.batch_size.max(1))
        .bind(locked_until)
        .bind(lease_token)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        // RETURNING order is unspecified
        results.sort_by_key(|item| item.scheduled_at);
        Ok(results.into_iter().map(FollowUpQueueItem::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_sequence(&self, id: Uuid) -> RepoResult<Option<FollowUpSequence>> {
        let result = sqlx::query_as::<_, SequenceModel>(
            r#"
            SELECT id, company_id, name, is_active, stop_on_reply, agent_id, operating_hours
            FROM followup_sequences
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(FollowUpSequence::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_step(&self, id: Uuid) -> RepoResult<Option<FollowUpStep>> {
        let result = sqlx::query_as::<_, StepModel>(
            r#"
            SELECT id, sequence_id, position, delay_minutes, content_type, content
            FROM followup_steps
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(FollowUpStep::from))
    }

    #[instrument(skip(self))]
    async fn find_next_step(
        &self,
        sequence_id: Uuid,
        position: i32,
    ) -> RepoResult<Option<FollowUpStep>> {
        let result = sqlx::query_as::<_, StepModel>(
            r#"
            SELECT id, sequence_id, position, delay_minutes, content_type, content
            FROM followup_steps
            WHERE sequence_id = $1 AND position > $2
            ORDER BY position
            LIMIT 1
            "#,
        )
        .bind(sequence_id)
        .bind(position)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(FollowUpStep::from))
    }

    #[instrument(skip(self, item), fields(item_id = %item.id, step_id = %item.step_id))]
    async fn enqueue(&self, item: &FollowUpQueueItem) -> RepoResult<()> {
        let insert = QueueItemInsert::new(item);

        sqlx::query(
            r#"
            INSERT INTO followup_queue (
                id, company_id, sequence_id, step_id, conversation_id, status, scheduled_at,
                attempts, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8)
            "#,
        )
        .bind(insert.id)
        .bind(insert.company_id)
        .bind(insert.sequence_id)
        .bind(insert.step_id)
        .bind(insert.conversation_id)
        .bind(insert.status)
        .bind(insert.scheduled_at)
        .bind(insert.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_foreign_key_violation(e, || {
                DomainError::ConversationNotFound(item.conversation_id)
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn renew_lease(
        &self,
        item: &FollowUpQueueItem,
        until: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE followup_queue
            SET locked_until = $3
            WHERE id = $1 AND status = 'processing' AND lease_token = $2
            "#,
        )
        .bind(item.id)
        .bind(item.lease_token)
        .bind(until)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, item, error), fields(item_id = %item.id))]
    async fn finish(
        &self,
        item: &FollowUpQueueItem,
        status: QueueStatus,
        error: Option<&str>,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        if !status.is_terminal() {
            return Err(DomainError::InternalError(format!(
                "cannot finish queue item with non-terminal status {}",
                status.as_str()
            )));
        }

        let result = sqlx::query(
            r#"
            UPDATE followup_queue
            SET status = $3, last_error = $4, processed_at = $5,
                locked_until = NULL, lease_token = NULL
            WHERE id = $1 AND status = 'processing' AND lease_token = $2
            "#,
        )
        .bind(item.id)
        .bind(item.lease_token)
        .bind(status.as_str())
        .bind(error)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::QueueItemNotClaimable);
        }

        Ok(())
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn release(
        &self,
        item: &FollowUpQueueItem,
        scheduled_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE followup_queue
            SET status = 'pending',
                scheduled_at = $3,
                locked_until = NULL,
                lease_token = NULL,
                attempts = GREATEST(attempts - 1, 0)
            WHERE id = $1 AND status = 'processing' AND lease_token = $2
            "#,
        )
        .bind(item.id)
        .bind(item.lease_token)
        .bind(scheduled_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::QueueItemNotClaimable);
        }

        Ok(())
    }
}
