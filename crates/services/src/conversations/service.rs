use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::auth::ports::{UserId, UserRepository};
use crate::conversations::errors::ConversationError;
use crate::conversations::fingerprint::{conversation_fingerprint, is_duplicate_conversation};
use crate::conversations::models::{
    Conversation, ConversationId, CreateConversationParams, Message, NewConversation,
};
use crate::conversations::participants::resolve_participants;
use crate::conversations::ports::{
    ConversationRepository, ConversationServiceTrait, MessageRepository,
};
use crate::conversations::rate_limit::{RateLimitDecision, RateLimiter};
use crate::validation::{sanitize_html, validate_string};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Conversation service: validation pipeline in front of the repositories.
///
/// Each operation short-circuits at the first failing stage, in the order
/// text validation, participant resolution, rate limit, duplicate check,
/// persistence.
pub struct ConversationServiceImpl {
    conv_repo: Arc<dyn ConversationRepository>,
    msg_repo: Arc<dyn MessageRepository>,
    user_repo: Arc<dyn UserRepository>,
    rate_limiter: RateLimiter,
}

impl ConversationServiceImpl {
    pub fn new(
        conv_repo: Arc<dyn ConversationRepository>,
        msg_repo: Arc<dyn MessageRepository>,
        user_repo: Arc<dyn UserRepository>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            conv_repo,
            msg_repo,
            user_repo,
            rate_limiter,
        }
    }

    /// Collapse a rate-limit decision: `Unknown` is allowed through (fail
    /// open), `Limited` becomes an error.
    fn enforce(decision: RateLimitDecision) -> Result<(), ConversationError> {
        match decision {
            RateLimitDecision::Allowed => Ok(()),
            RateLimitDecision::Unknown { action } => {
                warn!("{action} limiter unavailable, allowing request");
                Ok(())
            }
            RateLimitDecision::Limited {
                action,
                count,
                limit,
            } => {
                info!("{action} rate limit hit: {count}/{limit}");
                Err(ConversationError::RateLimited { action })
            }
        }
    }

    /// Fetch a live conversation, hiding conversations the user is not part
    /// of.
    async fn get_for_user(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> Result<Option<Conversation>, ConversationError> {
        let conversation = self
            .conv_repo
            .get_by_id(conversation_id)
            .await
            .map_err(|e| {
                ConversationError::InternalError(format!("Failed to get conversation: {e}"))
            })?;

        Ok(conversation.filter(|c| c.involves(user_id)))
    }
}

#[async_trait]
impl ConversationServiceTrait for ConversationServiceImpl {
    async fn create_conversation(
        &self,
        creator: UserId,
        request: CreateConversationParams,
    ) -> Result<Conversation, ConversationError> {
        validate_string(&request.title, MAX_TITLE_LENGTH)?;
        if let Some(description) = &request.description {
            validate_string(description, MAX_DESCRIPTION_LENGTH)?;
        }

        let participants =
            resolve_participants(creator, &request.participant_ids, self.user_repo.as_ref())
                .await?;
        let participant_ids: Vec<UserId> = participants.iter().map(|user| user.id).collect();

        Self::enforce(self.rate_limiter.check_conversation_create(creator).await)?;

        let fingerprint = conversation_fingerprint(&participant_ids, &request.title);
        if is_duplicate_conversation(self.conv_repo.as_ref(), creator, &fingerprint).await {
            return Err(ConversationError::DuplicateConversation);
        }

        let conversation = self
            .conv_repo
            .create(NewConversation {
                creator_id: creator,
                title: request.title,
                description: request.description,
                fingerprint,
                participant_ids,
            })
            .await
            .map_err(|e| {
                ConversationError::InternalError(format!("Failed to create conversation: {e}"))
            })?;

        info!(
            "Created conversation {} for user {} with {} participants",
            conversation.id,
            creator,
            conversation.participant_ids.len()
        );
        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> Result<Option<Conversation>, ConversationError> {
        self.get_for_user(conversation_id, user_id).await
    }

    async fn list_conversations(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Conversation>, ConversationError> {
        self.conv_repo
            .list_for_user(user_id, limit, offset)
            .await
            .map_err(|e| {
                ConversationError::InternalError(format!("Failed to list conversations: {e}"))
            })
    }

    async fn delete_conversation(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> Result<bool, ConversationError> {
        let Some(conversation) = self.get_for_user(conversation_id, user_id).await? else {
            return Ok(false);
        };

        if conversation.creator_id != user_id {
            return Err(ConversationError::Validation(
                "Only the conversation creator can delete a conversation".to_string(),
            ));
        }

        Self::enforce(self.rate_limiter.check_conversation_delete(user_id).await)?;

        let deleted = self
            .conv_repo
            .soft_delete(conversation_id, user_id)
            .await
            .map_err(|e| {
                ConversationError::InternalError(format!("Failed to delete conversation: {e}"))
            })?;

        if deleted {
            info!("Deleted conversation {conversation_id} for user {user_id}");
        }
        Ok(deleted)
    }

    async fn send_message(
        &self,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: String,
        allow_formatting: bool,
    ) -> Result<Message, ConversationError> {
        // Membership first, so outsiders cannot probe rate limits or
        // validation rules of conversations they cannot see
        self.get_for_user(conversation_id, sender_id)
            .await?
            .ok_or(ConversationError::NotFound)?;

        validate_string(&content, MAX_MESSAGE_LENGTH)?;

        Self::enforce(
            self.rate_limiter
                .check_message_send(sender_id, conversation_id)
                .await,
        )?;

        let sanitized = sanitize_html(&content, allow_formatting);

        self.msg_repo
            .create(conversation_id, sender_id, sanitized)
            .await
            .map_err(|e| ConversationError::InternalError(format!("Failed to store message: {e}")))
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Message>, ConversationError> {
        self.get_for_user(conversation_id, user_id)
            .await?
            .ok_or(ConversationError::NotFound)?;

        self.msg_repo
            .list_by_conversation(conversation_id, limit)
            .await
            .map_err(|e| ConversationError::InternalError(format!("Failed to list messages: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ports::{MockUserRepository, User};
    use crate::conversations::ports::{MockConversationRepository, MockMessageRepository};
    use crate::conversations::rate_limit::RateLimitAction;
    use chrono::Utc;
    use config::LimitsConfig;
    use serde_json::json;
    use uuid::Uuid;

    fn user(id: i64) -> User {
        User {
            id: UserId(id),
            email: format!("user{id}@example.com"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            bio: None,
            availability_start: None,
            availability_end: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn users_repo() -> MockUserRepository {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_ids().returning(|requested| {
            Ok(requested
                .into_iter()
                .filter(|id| id.0 < 100)
                .map(|id| user(id.0))
                .collect())
        });
        repo
    }

    fn conversation(id: ConversationId, creator: i64, participants: &[i64]) -> Conversation {
        Conversation {
            id,
            creator_id: UserId(creator),
            title: "Kickoff".to_string(),
            description: None,
            fingerprint: "f".to_string(),
            participant_ids: participants.iter().copied().map(UserId).collect(),
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(
        conv_repo: MockConversationRepository,
        msg_repo: MockMessageRepository,
        user_repo: MockUserRepository,
    ) -> ConversationServiceImpl {
        let conv_repo = Arc::new(conv_repo);
        let msg_repo = Arc::new(msg_repo);
        let rate_limiter = RateLimiter::new(
            LimitsConfig::default(),
            conv_repo.clone() as Arc<dyn ConversationRepository>,
            msg_repo.clone() as Arc<dyn MessageRepository>,
        );
        ConversationServiceImpl::new(conv_repo, msg_repo, Arc::new(user_repo), rate_limiter)
    }

    fn create_params(title: &str, participant_ids: Vec<serde_json::Value>) -> CreateConversationParams {
        CreateConversationParams {
            title: title.to_string(),
            description: None,
            participant_ids,
        }
    }

    #[tokio::test]
    async fn creates_conversation_through_the_full_pipeline() {
        let mut conv_repo = MockConversationRepository::new();
        conv_repo.expect_count_created_since().returning(|_, _| Ok(0));
        conv_repo
            .expect_exists_with_fingerprint()
            .returning(|_, _| Ok(false));
        conv_repo.expect_create().returning(|new| {
            Ok(Conversation {
                id: ConversationId(Uuid::new_v4()),
                creator_id: new.creator_id,
                title: new.title,
                description: new.description,
                fingerprint: new.fingerprint,
                participant_ids: new.participant_ids,
                deleted_at: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });

        let service = service(conv_repo, MockMessageRepository::new(), users_repo());
        let created = service
            .create_conversation(
                UserId(1),
                create_params("Kickoff", vec![json!(1), json!(2), json!(3)]),
            )
            .await
            .unwrap();

        // Creator removed, others resolved
        assert_eq!(created.participant_ids, vec![UserId(2), UserId(3)]);
        assert!(!created.fingerprint.is_empty());
    }

    #[tokio::test]
    async fn rejects_duplicate_conversations() {
        let mut conv_repo = MockConversationRepository::new();
        conv_repo.expect_count_created_since().returning(|_, _| Ok(0));
        conv_repo
            .expect_exists_with_fingerprint()
            .returning(|_, _| Ok(true));

        let service = service(conv_repo, MockMessageRepository::new(), users_repo());
        let err = service
            .create_conversation(UserId(1), create_params("Kickoff", vec![json!(2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::DuplicateConversation));
    }

    #[tokio::test]
    async fn create_fails_open_when_duplicate_check_errors() {
        let mut conv_repo = MockConversationRepository::new();
        conv_repo.expect_count_created_since().returning(|_, _| Ok(0));
        conv_repo
            .expect_exists_with_fingerprint()
            .returning(|_, _| Err(anyhow::anyhow!("timeout")));
        conv_repo.expect_create().returning(|new| {
            Ok(Conversation {
                id: ConversationId(Uuid::new_v4()),
                creator_id: new.creator_id,
                title: new.title,
                description: new.description,
                fingerprint: new.fingerprint,
                participant_ids: new.participant_ids,
                deleted_at: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });

        let service = service(conv_repo, MockMessageRepository::new(), users_repo());
        assert!(service
            .create_conversation(UserId(1), create_params("Kickoff", vec![json!(2)]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn create_is_rate_limited() {
        let mut conv_repo = MockConversationRepository::new();
        conv_repo.expect_count_created_since().returning(|_, _| Ok(10));

        let service = service(conv_repo, MockMessageRepository::new(), users_repo());
        let err = service
            .create_conversation(UserId(1), create_params("Kickoff", vec![json!(2)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConversationError::RateLimited {
                action: RateLimitAction::ConversationCreate
            }
        ));
    }

    #[tokio::test]
    async fn rejects_invalid_title_before_any_lookup() {
        let service = service(
            MockConversationRepository::new(),
            MockMessageRepository::new(),
            MockUserRepository::new(),
        );
        let err = service
            .create_conversation(UserId(1), create_params("=cmd", vec![json!(2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_participants() {
        let service = service(
            MockConversationRepository::new(),
            MockMessageRepository::new(),
            users_repo(),
        );
        let err = service
            .create_conversation(UserId(1), create_params("Kickoff", vec![json!(2), json!(400)]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid user IDs: 400");
    }

    #[tokio::test]
    async fn send_message_sanitizes_content() {
        let conv_id = ConversationId(Uuid::new_v4());
        let mut conv_repo = MockConversationRepository::new();
        conv_repo
            .expect_get_by_id()
            .returning(move |id| Ok(Some(conversation(id, 1, &[2]))));

        let mut msg_repo = MockMessageRepository::new();
        msg_repo.expect_count_sent_since().returning(|_, _, _| Ok(0));
        msg_repo
            .expect_create()
            .withf(|_, _, content| content == "Hello world")
            .returning(|conversation_id, sender_id, content| {
                Ok(Message {
                    id: crate::conversations::models::MessageId(Uuid::new_v4()),
                    conversation_id,
                    sender_id,
                    content,
                    created_at: Utc::now(),
                })
            });

        let service = service(conv_repo, msg_repo, MockUserRepository::new());
        let message = service
            .send_message(conv_id, UserId(2), "Hello <b>world</b>".to_string(), false)
            .await
            .unwrap();
        assert_eq!(message.content, "Hello world");
    }

    #[tokio::test]
    async fn send_message_hides_foreign_conversations() {
        let mut conv_repo = MockConversationRepository::new();
        conv_repo
            .expect_get_by_id()
            .returning(move |id| Ok(Some(conversation(id, 1, &[2]))));

        let service = service(conv_repo, MockMessageRepository::new(), MockUserRepository::new());
        let err = service
            .send_message(
                ConversationId(Uuid::new_v4()),
                UserId(9),
                "hi there".to_string(),
                false,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::NotFound));
    }

    #[tokio::test]
    async fn send_message_fails_open_when_limiter_errors() {
        let conv_id = ConversationId(Uuid::new_v4());
        let mut conv_repo = MockConversationRepository::new();
        conv_repo
            .expect_get_by_id()
            .returning(move |id| Ok(Some(conversation(id, 1, &[2]))));

        let mut msg_repo = MockMessageRepository::new();
        msg_repo
            .expect_count_sent_since()
            .returning(|_, _, _| Err(anyhow::anyhow!("pool exhausted")));
        msg_repo
            .expect_create()
            .returning(|conversation_id, sender_id, content| {
                Ok(Message {
                    id: crate::conversations::models::MessageId(Uuid::new_v4()),
                    conversation_id,
                    sender_id,
                    content,
                    created_at: Utc::now(),
                })
            });

        let service = service(conv_repo, msg_repo, MockUserRepository::new());
        assert!(service
            .send_message(conv_id, UserId(2), "hello again".to_string(), false)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn only_the_creator_can_delete() {
        let mut conv_repo = MockConversationRepository::new();
        conv_repo
            .expect_get_by_id()
            .returning(move |id| Ok(Some(conversation(id, 1, &[2]))));

        let service = service(conv_repo, MockMessageRepository::new(), MockUserRepository::new());
        let err = service
            .delete_conversation(ConversationId(Uuid::new_v4()), UserId(2))
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_is_rate_limited() {
        let mut conv_repo = MockConversationRepository::new();
        conv_repo
            .expect_get_by_id()
            .returning(move |id| Ok(Some(conversation(id, 1, &[2]))));
        conv_repo.expect_count_deleted_since().returning(|_, _| Ok(10));

        let service = service(conv_repo, MockMessageRepository::new(), MockUserRepository::new());
        let err = service
            .delete_conversation(ConversationId(Uuid::new_v4()), UserId(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConversationError::RateLimited {
                action: RateLimitAction::ConversationDelete
            }
        ));
    }
}
