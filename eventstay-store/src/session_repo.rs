use async_trait::async_trait;
use eventstay_core::repository::SessionRepository;
use eventstay_core::{StoreError, StoreResult};
use eventstay_shared::Session;
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: i32,
    user_id: i32,
    token: String,
}

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_id, token FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(|row| Session {
            id: row.id,
            user_id: row.user_id,
            token: row.token,
        }))
    }
}
