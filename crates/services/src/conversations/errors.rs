use crate::conversations::rate_limit::RateLimitAction;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid user IDs: {}", format_id_list(.0))]
    UnknownParticipants(Vec<i64>),
    #[error("A conversation with the same participants and title already exists")]
    DuplicateConversation,
    #[error("{action} rate limit exceeded")]
    RateLimited { action: RateLimitAction },
    #[error("Conversation not found")]
    NotFound,
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<ValidationError> for ConversationError {
    fn from(err: ValidationError) -> Self {
        ConversationError::Validation(err.to_string())
    }
}

fn format_id_list(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
