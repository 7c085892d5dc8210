// Shared test harness: an in-memory store implementing the repository ports,
// wired into the real services and router.

use anyhow::Result;
use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use api::middleware::AuthState;
use api::AppState;
use config::LimitsConfig;
use services::auth::ports::{
    ProfileUpdate, Session, SessionId, SessionRepository, User, UserId, UserRepository,
};
use services::auth::{AuthService, AuthServiceTrait};
use services::common::hash_session_token;
use services::conversations::models::{
    Conversation, ConversationId, Message, MessageId, NewConversation,
};
use services::conversations::ports::{
    ConversationRepository, ConversationServiceTrait, MessageRepository,
};
use services::conversations::RateLimiter;
use services::users::UserServiceTrait;
use services::{ConversationService, UserService};

#[derive(Default)]
pub struct InMemoryStore {
    pub users: Mutex<HashMap<i64, User>>,
    pub sessions: Mutex<HashMap<String, Session>>,
    pub conversations: Mutex<Vec<Conversation>>,
    pub messages: Mutex<Vec<Message>>,
}

impl InMemoryStore {
    pub fn seed_user(&self, id: i64) {
        let now = Utc::now();
        self.users.lock().unwrap().insert(
            id,
            User {
                id: UserId(id),
                email: format!("user{id}@example.com"),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                bio: None,
                availability_start: None,
                availability_end: None,
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub fn seed_session(&self, user_id: i64, token: &str) {
        let now = Utc::now();
        self.sessions.lock().unwrap().insert(
            hash_session_token(token),
            Session {
                id: SessionId(Uuid::new_v4()),
                user_id: UserId(user_id),
                token_hash: hash_session_token(token),
                expires_at: now + Duration::hours(1),
                created_at: now,
            },
        );
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id.0).cloned())
    }

    async fn find_by_ids(&self, ids: Vec<UserId>) -> Result<Vec<User>> {
        let users = self.users.lock().unwrap();
        Ok(ids.iter().filter_map(|id| users.get(&id.0).cloned()).collect())
    }

    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.get_mut(&id.0) else {
            return Ok(None);
        };
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if update.availability_start.is_some() {
            user.availability_start = update.availability_start;
        }
        if update.availability_end.is_some() {
            user.availability_end = update.availability_end;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>> {
        Ok(self.sessions.lock().unwrap().get(token_hash).cloned())
    }
}

#[async_trait]
impl ConversationRepository for InMemoryStore {
    async fn create(&self, conversation: NewConversation) -> Result<Conversation> {
        let now = Utc::now();
        let created = Conversation {
            id: ConversationId(Uuid::new_v4()),
            creator_id: conversation.creator_id,
            title: conversation.title,
            description: conversation.description,
            fingerprint: conversation.fingerprint,
            participant_ids: conversation.participant_ids,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.conversations.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: ConversationId) -> Result<Option<Conversation>> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && c.deleted_at.is_none())
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Conversation>> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.deleted_at.is_none() && c.involves(user_id))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn soft_delete(&self, id: ConversationId, creator_id: UserId) -> Result<bool> {
        let mut conversations = self.conversations.lock().unwrap();
        for conversation in conversations.iter_mut() {
            if conversation.id == id
                && conversation.creator_id == creator_id
                && conversation.deleted_at.is_none()
            {
                conversation.deleted_at = Some(Utc::now());
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn exists_with_fingerprint(&self, creator_id: UserId, fingerprint: &str) -> Result<bool> {
        Ok(self.conversations.lock().unwrap().iter().any(|c| {
            c.creator_id == creator_id && c.fingerprint == fingerprint && c.deleted_at.is_none()
        }))
    }

    async fn count_created_since(&self, creator_id: UserId, since: DateTime<Utc>) -> Result<i64> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.creator_id == creator_id && c.created_at >= since)
            .count() as i64)
    }

    async fn count_deleted_since(&self, creator_id: UserId, since: DateTime<Utc>) -> Result<i64> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| {
                c.creator_id == creator_id && c.deleted_at.is_some_and(|at| at >= since)
            })
            .count() as i64)
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn create(
        &self,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: String,
    ) -> Result<Message> {
        let message = Message {
            id: MessageId(Uuid::new_v4()),
            conversation_id,
            sender_id,
            content,
            created_at: Utc::now(),
        };
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn list_by_conversation(
        &self,
        conversation_id: ConversationId,
        limit: i64,
    ) -> Result<Vec<Message>> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_sent_since(
        &self,
        sender_id: UserId,
        conversation_id: ConversationId,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| {
                m.sender_id == sender_id
                    && m.conversation_id == conversation_id
                    && m.created_at >= since
            })
            .count() as i64)
    }
}

/// Build a test server over the real services, backed by the in-memory store
pub fn test_server(store: Arc<InMemoryStore>, limits: LimitsConfig) -> TestServer {
    let user_repo = store.clone() as Arc<dyn UserRepository>;
    let session_repo = store.clone() as Arc<dyn SessionRepository>;
    let conv_repo = store.clone() as Arc<dyn ConversationRepository>;
    let msg_repo = store as Arc<dyn MessageRepository>;

    let rate_limiter = RateLimiter::new(limits, conv_repo.clone(), msg_repo.clone());
    let conversation_service = Arc::new(ConversationService::new(
        conv_repo,
        msg_repo,
        user_repo.clone(),
        rate_limiter,
    )) as Arc<dyn ConversationServiceTrait>;
    let user_service = Arc::new(UserService::new(user_repo.clone())) as Arc<dyn UserServiceTrait>;
    let auth_service =
        Arc::new(AuthService::new(user_repo, session_repo)) as Arc<dyn AuthServiceTrait>;

    let app_state = AppState {
        conversation_service,
        user_service,
    };
    let router = api::build_router(app_state, AuthState::new(auth_service));
    TestServer::new(router).expect("Failed to build test server")
}

/// A store pre-seeded with users 1-3 and a session for user 1
pub fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::default());
    for id in 1..=3 {
        store.seed_user(id);
    }
    store.seed_session(1, TOKEN);
    store
}

pub const TOKEN: &str = "oh-11111111222222223333333344444444";

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
