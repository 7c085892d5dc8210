use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

use crate::auth::ports::UserId;
use crate::conversations::errors::ConversationError;
use crate::conversations::models::{
    Conversation, ConversationId, CreateConversationParams, Message, NewConversation,
};

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Persist a validated conversation together with its participant rows
    async fn create(&self, conversation: NewConversation) -> Result<Conversation>;

    /// Get a conversation by ID; soft-deleted conversations are not returned
    async fn get_by_id(&self, id: ConversationId) -> Result<Option<Conversation>>;

    /// List conversations the user created or participates in
    async fn list_for_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Conversation>>;

    /// Soft-delete a conversation owned by `creator_id`; returns whether a
    /// row was affected
    async fn soft_delete(&self, id: ConversationId, creator_id: UserId) -> Result<bool>;

    /// Whether the creator already has a live conversation with this
    /// fingerprint
    async fn exists_with_fingerprint(&self, creator_id: UserId, fingerprint: &str) -> Result<bool>;

    /// Conversations created by the user at or after `since`
    async fn count_created_since(&self, creator_id: UserId, since: DateTime<Utc>) -> Result<i64>;

    /// Conversations deleted by the user at or after `since`
    async fn count_deleted_since(&self, creator_id: UserId, since: DateTime<Utc>) -> Result<i64>;
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a message with already-sanitized content
    async fn create(
        &self,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: String,
    ) -> Result<Message>;

    /// List messages in a conversation, oldest first
    async fn list_by_conversation(
        &self,
        conversation_id: ConversationId,
        limit: i64,
    ) -> Result<Vec<Message>>;

    /// Messages the user sent in this conversation at or after `since`
    async fn count_sent_since(
        &self,
        sender_id: UserId,
        conversation_id: ConversationId,
        since: DateTime<Utc>,
    ) -> Result<i64>;
}

#[async_trait]
pub trait ConversationServiceTrait: Send + Sync {
    async fn create_conversation(
        &self,
        creator: UserId,
        request: CreateConversationParams,
    ) -> Result<Conversation, ConversationError>;

    async fn get_conversation(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> Result<Option<Conversation>, ConversationError>;

    async fn list_conversations(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Conversation>, ConversationError>;

    async fn delete_conversation(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> Result<bool, ConversationError>;

    async fn send_message(
        &self,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: String,
        allow_formatting: bool,
    ) -> Result<Message, ConversationError>;

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Message>, ConversationError>;
}
