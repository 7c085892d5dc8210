use crate::pool::DbPool;
use crate::repositories::utils::map_db_error;
use anyhow::{Context, Result};
use async_trait::async_trait;
use services::auth::ports::{Session, SessionId, SessionRepository, UserId};
use uuid::Uuid;

pub struct PgSessionRepository {
    pool: DbPool,
}

impl PgSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_session(&self, row: tokio_postgres::Row) -> Result<Session> {
        let id: Uuid = row.try_get("id")?;
        let user_id: i64 = row.try_get("user_id")?;

        Ok(Session {
            id: SessionId(id),
            user_id: UserId(user_id),
            token_hash: row.try_get("token_hash")?,
            expires_at: row.try_get("expires_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_opt(
                "SELECT * FROM sessions WHERE token_hash = $1",
                &[&token_hash],
            )
            .await
            .map_err(map_db_error)?;

        match row {
            Some(row) => Ok(Some(self.row_to_session(row)?)),
            None => Ok(None),
        }
    }
}
