use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::common::hash_session_token;

pub mod ports;
pub use ports::*;

/// AuthService resolves bearer session tokens to users.
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    session_repository: Arc<dyn SessionRepository>,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        session_repository: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repository,
            session_repository,
        }
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let token_hash = hash_session_token(token);

        let session = self
            .session_repository
            .get_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::InternalError(format!("Failed to look up session: {e}")))?
            .ok_or(AuthError::InvalidToken)?;

        if session.expires_at <= Utc::now() {
            debug!("Rejected expired session: {}", session.id);
            return Err(AuthError::SessionExpired);
        }

        self.user_repository
            .get_by_id(session.user_id)
            .await
            .map_err(|e| AuthError::InternalError(format!("Failed to get user: {e}")))?
            .ok_or(AuthError::UserNotFound)
    }
}
