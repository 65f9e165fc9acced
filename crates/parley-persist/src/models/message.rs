use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Database-agnostic chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub regenerated: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(chat_id: Uuid, content: impl Into<String>) -> Self {
        Self::new(chat_id, MessageRole::User, content.into(), false)
    }

    pub fn assistant(chat_id: Uuid, content: impl Into<String>) -> Self {
        Self::new(chat_id, MessageRole::Assistant, content.into(), false)
    }

    /// Assistant reply produced by a regenerate request
    pub fn regenerated(chat_id: Uuid, content: impl Into<String>) -> Self {
        Self::new(chat_id, MessageRole::Assistant, content.into(), true)
    }

    fn new(chat_id: Uuid, role: MessageRole, content: String, regenerated: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id,
            role,
            content,
            regenerated,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl From<ChatMessage> for parley_llm::Message {
    fn from(msg: ChatMessage) -> Self {
        match msg.role {
            MessageRole::User => parley_llm::Message::human(msg.content),
            MessageRole::Assistant => parley_llm::Message::ai(msg.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regenerated_flag_only_on_assistant() {
        let chat_id = Uuid::new_v4();
        assert!(!ChatMessage::user(chat_id, "hi").regenerated);
        assert!(!ChatMessage::assistant(chat_id, "hello").regenerated);

        let msg = ChatMessage::regenerated(chat_id, "hello again");
        assert!(msg.regenerated);
        assert_eq!(msg.role, MessageRole::Assistant);
    }

    #[test]
    fn test_into_llm_message() {
        let chat_id = Uuid::new_v4();
        let msg: parley_llm::Message = ChatMessage::user(chat_id, "hi").into();
        assert_eq!(msg.role(), "user");

        let msg: parley_llm::Message = ChatMessage::assistant(chat_id, "hello").into();
        assert_eq!(msg.role(), "assistant");
        assert_eq!(msg.content().as_text(), Some("hello"));
    }
}
