//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use counsel_core::entities::Message;
use counsel_core::traits::{MessageRepository, Page, PageRequest, RepoResult};
use counsel_core::value_objects::Snowflake;

use crate::models::{MessageModel, MESSAGE_COLUMNS};

use super::error::map_db_error;

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
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1 AND deleted_at IS NULL");
        let result = sqlx::query_as::<_, MessageModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Message::try_from).transpose()
    }

    #[instrument(skip(self, key))]
    async fn find_by_idempotency_key(
        &self,
        consultation_id: Snowflake,
        sender_id: Snowflake,
        key: &str,
    ) -> RepoResult<Option<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE consultation_id = $1 AND sender_id = $2 AND idempotency_key = $3"
        );
        let result = sqlx::query_as::<_, MessageModel>(&sql)
            .bind(consultation_id.into_inner())
            .bind(sender_id.into_inner())
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Message::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_page(
        &self,
        consultation_id: Snowflake,
        page: PageRequest,
    ) -> RepoResult<Page<Message>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE consultation_id = $1 AND deleted_at IS NULL",
        )
        .bind(consultation_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        // Snowflake ids grow with creation time, so id order is thread order
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE consultation_id = $1 AND deleted_at IS NULL \
             ORDER BY id ASC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, MessageModel>(&sql)
            .bind(consultation_id.into_inner())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let items = rows
            .into_iter()
            .map(Message::try_from)
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(Page::new(items, page, u64::try_from(total).unwrap_or(0)))
    }
}
