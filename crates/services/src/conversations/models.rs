use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::ports::UserId;
use crate::conversations::errors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl std::str::FromStr for ConversationId {
    type Err = errors::ConversationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.strip_prefix("conv_").unwrap_or(value);
        Uuid::parse_str(value).map(ConversationId).map_err(|e| {
            errors::ConversationError::Validation(format!(
                "Invalid conversation ID: {value}, error: {e}"
            ))
        })
    }
}

impl From<Uuid> for ConversationId {
    fn from(uuid: Uuid) -> Self {
        ConversationId(uuid)
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conv_{}", self.0.simple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl From<Uuid> for MessageId {
    fn from(uuid: Uuid) -> Self {
        MessageId(uuid)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "msg_{}", self.0.simple())
    }
}

/// Conversation model - a titled thread between a creator and participants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub creator_id: UserId,
    pub title: String,
    pub description: Option<String>,
    /// Order-independent digest of participants + title, used for advisory
    /// duplicate detection
    pub fingerprint: String,
    /// Participants other than the creator
    pub participant_ids: Vec<UserId>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Whether `user` is the creator or one of the participants
    pub fn involves(&self, user: UserId) -> bool {
        self.creator_id == user || self.participant_ids.contains(&user)
    }
}

/// A message within a conversation. `content` is stored sanitized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Domain model for a conversation-creation request. `participant_ids`
/// carries the raw JSON entries so the participant validator can coerce and
/// filter them itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationParams {
    pub title: String,
    pub description: Option<String>,
    pub participant_ids: Vec<serde_json::Value>,
}

/// Validated conversation data handed to the repository
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub creator_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub fingerprint: String,
    pub participant_ids: Vec<UserId>,
}
