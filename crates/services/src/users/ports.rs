use async_trait::async_trait;

use crate::auth::ports::{ProfileUpdate, User, UserId};

/// Errors that can occur during user profile operations
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Service trait for user profiles
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// Get a user by their ID
    async fn get_user(&self, user_id: UserId) -> Result<User, UserError>;

    /// Update a user's profile after validating every supplied field
    async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, UserError>;
}
