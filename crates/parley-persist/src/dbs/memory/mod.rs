use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PersistError, Result};
use crate::models::{ChatMessage, ChatSession, ModelDeployment};
use crate::trait_client::PersistenceClient;

#[derive(Default)]
struct Store {
    chats: HashMap<Uuid, ChatSession>,
    // insertion order is the message order
    messages: Vec<ChatMessage>,
    models: BTreeMap<String, ModelDeployment>,
}

/// Process-local backend, used by tests and `storage.backend = "memory"`
#[derive(Default)]
pub struct InMemoryPersistenceClient {
    store: RwLock<Store>,
}

impl InMemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceClient for InMemoryPersistenceClient {
    async fn create_chat(&self, owner: &str) -> Result<ChatSession> {
        let chat = ChatSession::new(owner);
        self.store.write().await.chats.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn get_chat(&self, chat_id: Uuid, owner: &str) -> Result<Option<ChatSession>> {
        let store = self.store.read().await;
        Ok(store
            .chats
            .get(&chat_id)
            .filter(|c| c.owner == owner)
            .cloned())
    }

    async fn list_chats(
        &self,
        owner: &str,
        limit: Option<i64>,
        skip: Option<i64>,
    ) -> Result<Vec<ChatSession>> {
        let store = self.store.read().await;
        let mut chats: Vec<ChatSession> = store
            .chats
            .values()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect();
        // id breaks timestamp ties so pages never overlap
        chats.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let skip = skip.unwrap_or(0).max(0) as usize;
        let limit = limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(chats.into_iter().skip(skip).take(limit).collect())
    }

    async fn delete_chat(&self, chat_id: Uuid, owner: &str) -> Result<bool> {
        let mut store = self.store.write().await;
        let owned = store
            .chats
            .get(&chat_id)
            .is_some_and(|c| c.owner == owner);
        if !owned {
            return Ok(false);
        }
        store.chats.remove(&chat_id);
        let before = store.messages.len();
        store.messages.retain(|m| m.chat_id != chat_id);
        tracing::debug!(
            chat_id = %chat_id,
            messages = before - store.messages.len(),
            "Chat deleted"
        );
        Ok(true)
    }

    async fn set_chat_title(&self, chat_id: Uuid, title: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let chat = store
            .chats
            .get_mut(&chat_id)
            .ok_or_else(|| PersistError::ChatNotFound(chat_id.to_string()))?;
        chat.title = Some(title.to_string());
        Ok(())
    }

    async fn save_message(&self, message: ChatMessage) -> Result<()> {
        let mut store = self.store.write().await;
        let chat = store
            .chats
            .get_mut(&message.chat_id)
            .ok_or_else(|| PersistError::ChatNotFound(message.chat_id.to_string()))?;
        chat.updated_at = Utc::now();
        store.messages.push(message);
        Ok(())
    }

    async fn get_messages(&self, chat_id: Uuid) -> Result<Vec<ChatMessage>> {
        let store = self.store.read().await;
        Ok(store
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect())
    }

    async fn delete_message(&self, message_id: Uuid) -> Result<bool> {
        let mut store = self.store.write().await;
        let before = store.messages.len();
        store.messages.retain(|m| m.id != message_id);
        Ok(store.messages.len() != before)
    }

    async fn upsert_model(&self, model: ModelDeployment) -> Result<()> {
        self.store
            .write()
            .await
            .models
            .insert(model.name.clone(), model);
        Ok(())
    }

    async fn list_active_models(&self) -> Result<Vec<ModelDeployment>> {
        let store = self.store.read().await;
        Ok(store.models.values().filter(|m| m.active).cloned().collect())
    }

    async fn find_active_model(&self, name: &str) -> Result<Option<ModelDeployment>> {
        let store = self.store.read().await;
        Ok(store.models.get(name).filter(|m| m.active).cloned())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
