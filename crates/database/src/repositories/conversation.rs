use std::collections::HashMap;

use crate::pool::DbPool;
use crate::repositories::utils::map_db_error;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use services::auth::ports::UserId;
use services::conversations::models::{Conversation, ConversationId, NewConversation};
use services::conversations::ports::ConversationRepository;
use tracing::debug;
use uuid::Uuid;

pub struct PgConversationRepository {
    pool: DbPool,
}

impl PgConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // Helper method to convert database row to Conversation model
    fn row_to_conversation(
        &self,
        row: tokio_postgres::Row,
        participant_ids: Vec<UserId>,
    ) -> Result<Conversation> {
        let id: Uuid = row.try_get("id")?;
        let creator_id: i64 = row.try_get("creator_id")?;

        Ok(Conversation {
            id: ConversationId(id),
            creator_id: UserId(creator_id),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            fingerprint: row.try_get("fingerprint")?,
            participant_ids,
            deleted_at: row.try_get("deleted_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Fetch participant IDs for a batch of conversations in one query
    async fn participants_for(
        &self,
        client: &deadpool_postgres::Client,
        conversation_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<UserId>>> {
        if conversation_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = client
            .query(
                "SELECT conversation_id, user_id FROM conversation_participants
                 WHERE conversation_id = ANY($1) ORDER BY user_id",
                &[&conversation_ids.to_vec()],
            )
            .await
            .map_err(map_db_error)?;

        let mut by_conversation: HashMap<Uuid, Vec<UserId>> = HashMap::new();
        for row in rows {
            let conversation_id: Uuid = row.try_get("conversation_id")?;
            let user_id: i64 = row.try_get("user_id")?;
            by_conversation
                .entry(conversation_id)
                .or_default()
                .push(UserId(user_id));
        }
        Ok(by_conversation)
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    /// Create a conversation and its participant rows in one transaction
    async fn create(&self, conversation: NewConversation) -> Result<Conversation> {
        let mut client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let id = Uuid::new_v4();
        let now = Utc::now();

        let tx = client
            .transaction()
            .await
            .context("Failed to start transaction")?;

        let row = tx
            .query_one(
                r#"
            INSERT INTO conversations
                (id, creator_id, title, description, fingerprint, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
                &[
                    &id,
                    &conversation.creator_id.0,
                    &conversation.title,
                    &conversation.description,
                    &conversation.fingerprint,
                    &now,
                    &now,
                ],
            )
            .await
            .map_err(map_db_error)?;

        for participant in &conversation.participant_ids {
            tx.execute(
                "INSERT INTO conversation_participants (conversation_id, user_id) VALUES ($1, $2)",
                &[&id, &participant.0],
            )
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.context("Failed to commit conversation")?;

        debug!(
            "Created conversation: {} for user: {}",
            id, conversation.creator_id
        );
        self.row_to_conversation(row, conversation.participant_ids)
    }

    async fn get_by_id(&self, id: ConversationId) -> Result<Option<Conversation>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_opt(
                "SELECT * FROM conversations WHERE id = $1 AND deleted_at IS NULL",
                &[&id.0],
            )
            .await
            .map_err(map_db_error)?;

        match row {
            Some(row) => {
                let participants = self.participants_for(&client, &[id.0]).await?;
                let participant_ids = participants.get(&id.0).cloned().unwrap_or_default();
                Ok(Some(self.row_to_conversation(row, participant_ids)?))
            }
            None => Ok(None),
        }
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Conversation>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let rows = client
            .query(
                r#"
            SELECT DISTINCT c.* FROM conversations c
            LEFT JOIN conversation_participants p ON p.conversation_id = c.id
            WHERE c.deleted_at IS NULL AND (c.creator_id = $1 OR p.user_id = $1)
            ORDER BY c.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
                &[&user_id.0, &limit, &offset],
            )
            .await
            .map_err(map_db_error)?;

        let conversation_ids: Vec<Uuid> = rows
            .iter()
            .map(|row| row.try_get("id"))
            .collect::<Result<_, _>>()?;
        let mut participants = self.participants_for(&client, &conversation_ids).await?;

        rows.into_iter()
            .map(|row| {
                let id: Uuid = row.try_get("id")?;
                let participant_ids = participants.remove(&id).unwrap_or_default();
                self.row_to_conversation(row, participant_ids)
            })
            .collect()
    }

    async fn soft_delete(&self, id: ConversationId, creator_id: UserId) -> Result<bool> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let affected = client
            .execute(
                "UPDATE conversations SET deleted_at = now(), updated_at = now()
                 WHERE id = $1 AND creator_id = $2 AND deleted_at IS NULL",
                &[&id.0, &creator_id.0],
            )
            .await
            .map_err(map_db_error)?;

        Ok(affected > 0)
    }

    async fn exists_with_fingerprint(&self, creator_id: UserId, fingerprint: &str) -> Result<bool> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_one(
                "SELECT EXISTS(
                     SELECT 1 FROM conversations
                     WHERE creator_id = $1 AND fingerprint = $2 AND deleted_at IS NULL
                 )",
                &[&creator_id.0, &fingerprint],
            )
            .await
            .map_err(map_db_error)?;

        Ok(row.try_get(0)?)
    }

    async fn count_created_since(&self, creator_id: UserId, since: DateTime<Utc>) -> Result<i64> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        // Soft-deleted rows still count as creation events
        let row = client
            .query_one(
                "SELECT COUNT(*) FROM conversations WHERE creator_id = $1 AND created_at >= $2",
                &[&creator_id.0, &since],
            )
            .await
            .map_err(map_db_error)?;

        Ok(row.try_get(0)?)
    }

    async fn count_deleted_since(&self, creator_id: UserId, since: DateTime<Utc>) -> Result<i64> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_one(
                "SELECT COUNT(*) FROM conversations WHERE creator_id = $1 AND deleted_at >= $2",
                &[&creator_id.0, &since],
            )
            .await
            .map_err(map_db_error)?;

        Ok(row.try_get(0)?)
    }
}
