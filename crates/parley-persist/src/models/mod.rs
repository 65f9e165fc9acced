mod chat;
mod message;
mod model;

// Export database-agnostic models
pub use chat::{ChatSession, TITLE_MAX_CHARS};
pub use message::{ChatMessage, MessageRole};
pub use model::ModelDeployment;
