use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::auth::ports::{ProfileUpdate, User, UserId, UserRepository};
use crate::validation::{
    validate_availability, validate_name, validate_string, ValidationError, MAX_NAME_LENGTH,
};

pub mod ports;
pub use ports::*;

const MAX_BIO_LENGTH: usize = 500;

/// UserService handles profile reads and validated profile updates
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }
}

impl From<ValidationError> for UserError {
    fn from(err: ValidationError) -> Self {
        UserError::Validation(err.to_string())
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn get_user(&self, user_id: UserId) -> Result<User, UserError> {
        debug!("Getting user: {}", user_id);

        self.user_repository
            .get_by_id(user_id)
            .await
            .map_err(|e| UserError::InternalError(format!("Failed to get user: {e}")))?
            .ok_or(UserError::UserNotFound)
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, UserError> {
        debug!("Updating profile for user: {}", user_id);

        if let Some(first_name) = &update.first_name {
            validate_name(first_name, MAX_NAME_LENGTH)?;
        }
        if let Some(last_name) = &update.last_name {
            validate_name(last_name, MAX_NAME_LENGTH)?;
        }
        if let Some(bio) = &update.bio {
            validate_string(bio, MAX_BIO_LENGTH)?;
        }
        validate_availability(update.availability_start, update.availability_end)?;

        self.user_repository
            .update_profile(user_id, update)
            .await
            .map_err(|e| UserError::InternalError(format!("Failed to update profile: {e}")))?
            .ok_or(UserError::UserNotFound)
    }
}
