pub mod errors;
pub mod fingerprint;
pub mod models;
pub mod participants;
pub mod ports;
pub mod rate_limit;
pub mod service;

pub use errors::ConversationError;
pub use models::{Conversation, ConversationId, CreateConversationParams, Message, MessageId};
pub use rate_limit::{RateLimitAction, RateLimitDecision, RateLimiter};
