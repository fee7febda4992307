//! PostgreSQL implementation of ConsultationRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use counsel_core::entities::{Consultation, Message};
use counsel_core::error::DomainError;
use counsel_core::traits::{
    ConsultationChange, ConsultationQuery, ConsultationRepository, ConsultationStats, Page,
    ReadReceipt, RepoResult, Scope,
};
use counsel_core::value_objects::{ConsultationStatus, Snowflake};

use crate::mappers::{parse_column, ConsultationRow, MessageInsert};
use crate::models::{ConsultationModel, StatusCountModel, CONSULTATION_COLUMNS};

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of ConsultationRepository
#[derive(Clone)]
pub struct PgConsultationRepository {
    pool: PgPool,
}

impl PgConsultationRepository {
    /// Create a new PgConsultationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn scope_ids(scope: Scope) -> (Option<i64>, Option<i64>) {
        match scope {
            Scope::All => (None, None),
            Scope::Customer(id) => (Some(id.into_inner()), None),
            Scope::Lawyer(id) => (None, Some(id.into_inner())),
        }
    }

    async fn exists(tx: &mut Transaction<'_, Postgres>, id: Snowflake) -> RepoResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM consultations WHERE id = $1")
            .bind(id.into_inner())
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_db_error)?;
        Ok(found.is_some())
    }

    async fn insert_message(
        tx: &mut Transaction<'_, Postgres>,
        message: &Message,
    ) -> RepoResult<()> {
        let row = MessageInsert::new(message);
        sqlx::query(
            r#"
            INSERT INTO messages (
                id, consultation_id, sender_id, sender_role, content, message_type,
                attachments, reply_to_id, reply_to_content, reply_to_sender_id,
                is_read, read_at, idempotency_key, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(row.id)
        .bind(row.consultation_id)
        .bind(row.sender_id)
        .bind(row.sender_role)
        .bind(row.content)
        .bind(row.message_type)
        .bind(row.attachments)
        .bind(row.reply_to_id)
        .bind(row.reply_to_content)
        .bind(row.reply_to_sender_id)
        .bind(row.is_read)
        .bind(row.read_at)
        .bind(row.idempotency_key)
        .bind(row.created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateIdempotencyKey))?;

        Ok(())
    }

    async fn apply_read_receipt(
        tx: &mut Transaction<'_, Postgres>,
        consultation_id: Snowflake,
        receipt: ReadReceipt,
    ) -> RepoResult<()> {
        sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE, read_at = $3
            WHERE consultation_id = $1 AND is_read = FALSE AND sender_role <> $2
            "#,
        )
        .bind(consultation_id.into_inner())
        .bind(receipt.reader.as_str())
        .bind(receipt.read_at)
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

#[async_trait]
impl ConsultationRepository for PgConsultationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Consultation>> {
        let sql = format!("SELECT {CONSULTATION_COLUMNS} FROM consultations WHERE id = $1");
        let result = sqlx::query_as::<_, ConsultationModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Consultation::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_page(&self, query: &ConsultationQuery) -> RepoResult<Page<Consultation>> {
        const FILTER: &str = r#"
            WHERE ($1::BIGINT IS NULL OR customer_id = $1)
              AND ($2::BIGINT IS NULL OR lawyer_id = $2)
              AND ($3::TEXT IS NULL OR status = $3)
              AND (NOT $4 OR lawyer_id IS NULL)
        "#;

        let (customer_id, lawyer_id) = Self::scope_ids(query.scope);
        let status = query.status.map(ConsultationStatus::as_str);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM consultations {FILTER}"))
            .bind(customer_id)
            .bind(lawyer_id)
            .bind(status)
            .bind(query.unbound_only)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let sql = format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultations {FILTER} \
             ORDER BY requested_at DESC, id DESC LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, ConsultationModel>(&sql)
            .bind(customer_id)
            .bind(lawyer_id)
            .bind(status)
            .bind(query.unbound_only)
            .bind(query.page.limit())
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let items = rows
            .into_iter()
            .map(Consultation::try_from)
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(Page::new(items, query.page, u64::try_from(total).unwrap_or(0)))
    }

    #[instrument(skip(self, consultation), fields(consultation_id = %consultation.id))]
    async fn create(&self, consultation: &Consultation) -> RepoResult<()> {
        let row = ConsultationRow::new(consultation);
        let r = row.record;
        sqlx::query(
            r#"
            INSERT INTO consultations (
                id, customer_id, lawyer_id, subject, description, priority, status,
                chat_status, preferred_lawyer, attachments, customer_unread_count,
                lawyer_unread_count, requested_at, updated_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(row.id)
        .bind(row.customer_id)
        .bind(row.lawyer_id)
        .bind(&r.subject)
        .bind(&r.description)
        .bind(row.priority)
        .bind(row.status)
        .bind(row.chat_status)
        .bind(r.preferred_lawyer)
        .bind(&r.attachments)
        .bind(r.customer_unread_count)
        .bind(r.lawyer_unread_count)
        .bind(r.requested_at)
        .bind(r.updated_at)
        .bind(r.version)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, consultation), fields(consultation_id = %consultation.id))]
    async fn bind_lawyer_if_unbound(&self, consultation: &Consultation) -> RepoResult<bool> {
        let row = ConsultationRow::new(consultation);
        let result = sqlx::query(
            r#"
            UPDATE consultations
            SET lawyer_id = $2, status = $3, updated_at = $4, version = version + 1
            WHERE id = $1 AND lawyer_id IS NULL AND status = 'pending'
            "#,
        )
        .bind(row.id)
        .bind(row.lawyer_id)
        .bind(row.status)
        .bind(row.record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(
        skip(self, change),
        fields(consultation_id = %change.consultation.id, messages = change.new_messages.len())
    )]
    async fn commit(&self, change: &ConsultationChange) -> RepoResult<()> {
        let consultation = &change.consultation;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        if consultation.is_dirty() {
            let row = ConsultationRow::new(consultation);
            let r = row.record;
            let result = sqlx::query(
                r#"
                UPDATE consultations
                SET lawyer_id = $3, status = $4, chat_status = $5, response = $6, notes = $7,
                    decline_reason = $8, customer_unread_count = $9, lawyer_unread_count = $10,
                    chat_started_at = $11, last_message_at = $12, answered_at = $13,
                    completed_at = $14, updated_at = $15, version = $16
                WHERE id = $1 AND version = $2
                "#,
            )
            .bind(row.id)
            .bind(consultation.expected_version())
            .bind(row.lawyer_id)
            .bind(row.status)
            .bind(row.chat_status)
            .bind(&r.response)
            .bind(&r.notes)
            .bind(&r.decline_reason)
            .bind(r.customer_unread_count)
            .bind(r.lawyer_unread_count)
            .bind(r.chat_started_at)
            .bind(r.last_message_at)
            .bind(r.answered_at)
            .bind(r.completed_at)
            .bind(r.updated_at)
            .bind(r.version)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            if result.rows_affected() == 0 {
                return Err(if Self::exists(&mut tx, consultation.id).await? {
                    DomainError::StaleConsultation(consultation.id)
                } else {
                    DomainError::ConsultationNotFound(consultation.id)
                });
            }
        }

        // The receipt covers what was already in the thread, not the messages
        // written alongside it.
        if let Some(receipt) = change.read_receipt {
            Self::apply_read_receipt(&mut tx, consultation.id, receipt).await?;
        }
        for message in &change.new_messages {
            Self::insert_message(&mut tx, message).await?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stats(&self, scope: Scope) -> RepoResult<ConsultationStats> {
        let (customer_id, lawyer_id) = Self::scope_ids(scope);

        let rows = sqlx::query_as::<_, StatusCountModel>(
            r#"
            SELECT status, COUNT(*) AS count
            FROM consultations
            WHERE ($1::BIGINT IS NULL OR customer_id = $1)
              AND ($2::BIGINT IS NULL OR lawyer_id = $2)
            GROUP BY status
            "#,
        )
        .bind(customer_id)
        .bind(lawyer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut stats = ConsultationStats::default();
        for row in rows {
            stats.add(parse_column(&row.status)?, row.count);
        }

        stats.unread = match scope {
            Scope::All => 0,
            Scope::Customer(id) => sqlx::query_scalar(
                "SELECT COALESCE(SUM(customer_unread_count), 0)::BIGINT FROM consultations WHERE customer_id = $1",
            )
            .bind(id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?,
            Scope::Lawyer(id) => sqlx::query_scalar(
                "SELECT COALESCE(SUM(lawyer_unread_count), 0)::BIGINT FROM consultations WHERE lawyer_id = $1",
            )
            .bind(id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?,
        };

        Ok(stats)
    }
}
