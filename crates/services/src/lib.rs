pub mod auth;
pub mod common;
pub mod conversations;
pub mod users;
pub mod validation;

pub use auth::UserId;
pub use conversations::service::ConversationServiceImpl as ConversationService;
pub use users::UserService;
