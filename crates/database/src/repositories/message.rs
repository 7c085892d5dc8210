use crate::pool::DbPool;
use crate::repositories::utils::map_db_error;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use services::auth::ports::UserId;
use services::conversations::models::{ConversationId, Message, MessageId};
use services::conversations::ports::MessageRepository;
use tracing::debug;
use uuid::Uuid;

pub struct PgMessageRepository {
    pool: DbPool,
}

impl PgMessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_message(&self, row: tokio_postgres::Row) -> Result<Message> {
        let id: Uuid = row.try_get("id")?;
        let conversation_id: Uuid = row.try_get("conversation_id")?;
        let sender_id: i64 = row.try_get("sender_id")?;

        Ok(Message {
            id: MessageId(id),
            conversation_id: ConversationId(conversation_id),
            sender_id: UserId(sender_id),
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(
        &self,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: String,
    ) -> Result<Message> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = client
            .query_one(
                r#"
            INSERT INTO messages (id, conversation_id, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
                &[&id, &conversation_id.0, &sender_id.0, &content, &now],
            )
            .await
            .map_err(map_db_error)?;

        debug!(
            "Stored message {} in conversation {} from user {}",
            id, conversation_id, sender_id
        );
        self.row_to_message(row)
    }

    async fn list_by_conversation(
        &self,
        conversation_id: ConversationId,
        limit: i64,
    ) -> Result<Vec<Message>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let rows = client
            .query(
                "SELECT * FROM messages WHERE conversation_id = $1
                 ORDER BY created_at ASC LIMIT $2",
                &[&conversation_id.0, &limit],
            )
            .await
            .map_err(map_db_error)?;

        rows.into_iter().map(|row| self.row_to_message(row)).collect()
    }

    async fn count_sent_since(
        &self,
        sender_id: UserId,
        conversation_id: ConversationId,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_one(
                "SELECT COUNT(*) FROM messages
                 WHERE sender_id = $1 AND conversation_id = $2 AND created_at >= $3",
                &[&sender_id.0, &conversation_id.0, &since],
            )
            .await
            .map_err(map_db_error)?;

        Ok(row.try_get(0)?)
    }
}
