use crate::pool::DbPool;
use crate::repositories::utils::map_db_error;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use services::auth::ports::{ProfileUpdate, User, UserId, UserRepository};
use tracing::debug;

pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // Helper method to convert database row to User model
    fn row_to_user(&self, row: tokio_postgres::Row) -> Result<User> {
        let id: i64 = row.try_get("id")?;

        Ok(User {
            id: UserId(id),
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            bio: row.try_get("bio")?,
            availability_start: row.try_get("availability_start")?,
            availability_end: row.try_get("availability_end")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_opt("SELECT * FROM users WHERE id = $1", &[&id.0])
            .await
            .map_err(map_db_error)?;

        match row {
            Some(row) => Ok(Some(self.row_to_user(row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: Vec<UserId>) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let raw_ids: Vec<i64> = ids.into_iter().map(|id| id.0).collect();
        let rows = client
            .query(
                "SELECT * FROM users WHERE id = ANY($1) ORDER BY id",
                &[&raw_ids],
            )
            .await
            .map_err(map_db_error)?;

        debug!("Resolved {} of {} requested users", rows.len(), raw_ids.len());

        rows.into_iter().map(|row| self.row_to_user(row)).collect()
    }

    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<Option<User>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let now = Utc::now();

        let row = client
            .query_opt(
                r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                bio = COALESCE($4, bio),
                availability_start = COALESCE($5, availability_start),
                availability_end = COALESCE($6, availability_end),
                updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
                &[
                    &id.0,
                    &update.first_name,
                    &update.last_name,
                    &update.bio,
                    &update.availability_start,
                    &update.availability_end,
                    &now,
                ],
            )
            .await
            .map_err(map_db_error)?;

        match row {
            Some(row) => {
                debug!("Updated profile for user: {}", id);
                Ok(Some(self.row_to_user(row)?))
            }
            None => Ok(None),
        }
    }
}
