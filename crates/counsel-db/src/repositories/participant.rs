//! PostgreSQL implementation of ParticipantRepository over the `users` table

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use counsel_core::entities::Participant;
use counsel_core::traits::{ParticipantRepository, RepoResult};
use counsel_core::value_objects::Snowflake;

use crate::mappers::UserInsert;
use crate::models::UserModel;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a directory entry. Accounts are owned by the identity
    /// service; this is how its data (or test fixtures) land here.
    #[instrument(skip(self, participant), fields(user_id = %participant.id))]
    pub async fn upsert(&self, participant: &Participant) -> RepoResult<()> {
        let row = UserInsert::new(participant);
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, avatar, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, email = EXCLUDED.email,
                avatar = EXCLUDED.avatar, role = EXCLUDED.role
            "#,
        )
        .bind(row.id)
        .bind(row.name)
        .bind(row.email)
        .bind(row.avatar)
        .bind(row.role)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

#[async_trait]
impl ParticipantRepository for PgParticipantRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Participant>> {
        let result = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT id, name, email, avatar, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Participant::try_from).transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Participant>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();

        let rows = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT id, name, email, avatar, role, created_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Participant::try_from).collect()
    }
}
