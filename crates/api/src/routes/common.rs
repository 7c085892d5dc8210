use axum::http::StatusCode;
use services::conversations::ConversationError;
use services::users::UserError;

use crate::models::ErrorResponse;

/// Map conversation domain errors to HTTP status codes
pub fn map_conversation_error_to_status(error: &ConversationError) -> StatusCode {
    match error {
        ConversationError::Validation(_) | ConversationError::UnknownParticipants(_) => {
            StatusCode::BAD_REQUEST
        }
        ConversationError::DuplicateConversation => StatusCode::CONFLICT,
        ConversationError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        ConversationError::NotFound => StatusCode::NOT_FOUND,
        ConversationError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ConversationError> for ErrorResponse {
    fn from(error: ConversationError) -> Self {
        let error_type = match &error {
            ConversationError::Validation(_) | ConversationError::UnknownParticipants(_) => {
                "invalid_request_error"
            }
            ConversationError::DuplicateConversation => "duplicate_error",
            ConversationError::RateLimited { .. } => "rate_limit_exceeded",
            ConversationError::NotFound => "not_found_error",
            ConversationError::InternalError(_) => "internal_error",
        };
        ErrorResponse::new(error.to_string(), error_type.to_string())
    }
}

/// Map user domain errors to HTTP status codes
pub fn map_user_error_to_status(error: &UserError) -> StatusCode {
    match error {
        UserError::UserNotFound => StatusCode::NOT_FOUND,
        UserError::Validation(_) => StatusCode::BAD_REQUEST,
        UserError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<UserError> for ErrorResponse {
    fn from(error: UserError) -> Self {
        let error_type = match &error {
            UserError::UserNotFound => "not_found_error",
            UserError::Validation(_) => "invalid_request_error",
            UserError::InternalError(_) => "internal_error",
        };
        ErrorResponse::new(error.to_string(), error_type.to_string())
    }
}
