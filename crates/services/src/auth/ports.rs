use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

/// Identifier for a registered user. Positive integer, assigned by the
/// database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered OpenHub user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub availability_start: Option<DateTime<Utc>>,
    pub availability_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An authenticated session. The raw token is never stored, only its SHA-256
/// hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a profile update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub availability_start: Option<DateTime<Utc>>,
    pub availability_end: Option<DateTime<Utc>>,
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by ID
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Resolve a batch of user IDs; IDs with no matching record are simply
    /// absent from the result
    async fn find_by_ids(&self, ids: Vec<UserId>) -> Result<Vec<User>>;

    /// Apply a profile update, returning the updated user
    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<Option<User>>;
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Look up a session by the SHA-256 hash of its token
    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid session token")]
    InvalidToken,

    #[error("Session expired")]
    SessionExpired,

    #[error("User not found")]
    UserNotFound,

    #[error("Internal error: {0}")]
    InternalError(String),
}

#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    /// Resolve a bearer session token to the user it belongs to
    async fn authenticate(&self, token: &str) -> Result<User, AuthError>;
}
