pub mod conversation;
pub mod message;
pub mod session;
pub mod user;
pub mod utils;

pub use conversation::PgConversationRepository;
pub use message::PgMessageRepository;
pub use session::PgSessionRepository;
pub use user::PgUserRepository;
