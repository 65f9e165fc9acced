use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ChatMessage, ChatSession, ModelDeployment};

/// Trait for database persistence operations
///
/// Chat lookups take the owner so that a chat belonging to someone else
/// is indistinguishable from a missing one.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Create a new, empty chat for `owner`
    async fn create_chat(&self, owner: &str) -> Result<ChatSession>;

    async fn get_chat(&self, chat_id: Uuid, owner: &str) -> Result<Option<ChatSession>>;

    /// Chats for `owner`, most recently updated first
    async fn list_chats(
        &self,
        owner: &str,
        limit: Option<i64>,
        skip: Option<i64>,
    ) -> Result<Vec<ChatSession>>;

    /// Delete a chat and its messages; `false` when absent or not owned
    async fn delete_chat(&self, chat_id: Uuid, owner: &str) -> Result<bool>;

    async fn set_chat_title(&self, chat_id: Uuid, title: &str) -> Result<()>;

    /// Store a message and touch the chat's `updated_at`
    async fn save_message(&self, message: ChatMessage) -> Result<()>;

    /// All messages for a chat, in insertion order
    async fn get_messages(&self, chat_id: Uuid) -> Result<Vec<ChatMessage>>;

    async fn delete_message(&self, message_id: Uuid) -> Result<bool>;

    /// Insert or replace a model by name
    async fn upsert_model(&self, model: ModelDeployment) -> Result<()>;

    /// Active models ordered by name
    async fn list_active_models(&self) -> Result<Vec<ModelDeployment>>;

    async fn find_active_model(&self, name: &str) -> Result<Option<ModelDeployment>>;

    /// Cheap connectivity check
    async fn ping(&self) -> Result<()>;
}
