use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use config::LimitsConfig;
use tracing::warn;

use crate::auth::ports::UserId;
use crate::conversations::models::ConversationId;
use crate::conversations::ports::{ConversationRepository, MessageRepository};

/// The actions subject to trailing-window rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitAction {
    MessageSend,
    ConversationCreate,
    ConversationDelete,
}

impl std::fmt::Display for RateLimitAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RateLimitAction::MessageSend => "Message send",
            RateLimitAction::ConversationCreate => "Conversation create",
            RateLimitAction::ConversationDelete => "Conversation delete",
        };
        write!(f, "{name}")
    }
}

/// Outcome of a rate-limit check.
///
/// `Unknown` means the counting mechanism itself failed; callers collapse it
/// to "allow", so availability wins over strict enforcement when the
/// infrastructure is unhealthy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited {
        action: RateLimitAction,
        count: i64,
        limit: i64,
    },
    Unknown {
        action: RateLimitAction,
    },
}

impl RateLimitDecision {
    /// Whether the action may proceed under the fail-open policy
    pub fn permits(&self) -> bool {
        !matches!(self, RateLimitDecision::Limited { .. })
    }
}

/// Counts a user's recent actions via the repositories and compares them to
/// the configured ceilings.
pub struct RateLimiter {
    limits: LimitsConfig,
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl RateLimiter {
    pub fn new(
        limits: LimitsConfig,
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            limits,
            conversations,
            messages,
        }
    }

    fn window_start(&self) -> DateTime<Utc> {
        Utc::now() - Duration::seconds(self.limits.window_secs as i64)
    }

    pub async fn check_message_send(
        &self,
        sender: UserId,
        conversation: ConversationId,
    ) -> RateLimitDecision {
        let count = self
            .messages
            .count_sent_since(sender, conversation, self.window_start())
            .await;
        decide(RateLimitAction::MessageSend, count, self.limits.messages_per_window)
    }

    pub async fn check_conversation_create(&self, creator: UserId) -> RateLimitDecision {
        let count = self
            .conversations
            .count_created_since(creator, self.window_start())
            .await;
        decide(
            RateLimitAction::ConversationCreate,
            count,
            self.limits.conversations_per_window,
        )
    }

    pub async fn check_conversation_delete(&self, creator: UserId) -> RateLimitDecision {
        let count = self
            .conversations
            .count_deleted_since(creator, self.window_start())
            .await;
        decide(
            RateLimitAction::ConversationDelete,
            count,
            self.limits.deletions_per_window,
        )
    }
}

fn decide(
    action: RateLimitAction,
    count: anyhow::Result<i64>,
    limit: i64,
) -> RateLimitDecision {
    match count {
        Ok(count) if count < 0 => {
            // A negative count is as unusable as an error
            warn!("Nonsensical {action} count {count}, treating as unknown");
            RateLimitDecision::Unknown { action }
        }
        Ok(count) if count >= limit => RateLimitDecision::Limited {
            action,
            count,
            limit,
        },
        Ok(_) => RateLimitDecision::Allowed,
        Err(e) => {
            warn!("{action} rate limit count failed: {e}");
            RateLimitDecision::Unknown { action }
        }
    }
}
