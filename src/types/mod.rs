// Public modules
pub mod chat_detail;
pub mod ids;
pub mod message;
pub mod new_chat_params;
pub mod session_info;

// Re-exports
pub use chat_detail::ChatDetail;
pub use ids::{ChatId, MessageId, SessionId};
pub use message::{Message, Role};
pub use new_chat_params::NewChatParams;
pub use session_info::{ChatSummary, SessionInfo};
