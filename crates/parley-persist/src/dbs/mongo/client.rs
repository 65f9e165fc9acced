use async_trait::async_trait;
use mongodb::{bson::doc, Client, Database};
use uuid::Uuid;

use crate::dbs::mongo::models::{MongoChat, MongoMessage};
use crate::dbs::mongo::repositories::{
    MongoChatRepository, MongoMessageRepository, MongoModelRepository,
};
use crate::error::{PersistError, Result};
use crate::models::{ChatMessage, ChatSession, ModelDeployment};
use crate::trait_client::PersistenceClient;

pub struct MongoPersistenceClient {
    db: Database,
    chat_repo: MongoChatRepository,
    message_repo: MongoMessageRepository,
    model_repo: MongoModelRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;
        let db = client.database(database);

        tracing::info!(database = %database, "MongoDB client created");

        Ok(Self {
            chat_repo: MongoChatRepository::new(&db),
            message_repo: MongoMessageRepository::new(&db),
            model_repo: MongoModelRepository::new(&db),
            db,
        })
    }
}

#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn create_chat(&self, owner: &str) -> Result<ChatSession> {
        let chat = ChatSession::new(owner);
        self.chat_repo.insert(MongoChat::from(chat.clone())).await?;
        Ok(chat)
    }

    async fn get_chat(&self, chat_id: Uuid, owner: &str) -> Result<Option<ChatSession>> {
        self.chat_repo
            .find(&chat_id.to_string(), owner)
            .await?
            .map(ChatSession::try_from)
            .transpose()
    }

    async fn list_chats(
        &self,
        owner: &str,
        limit: Option<i64>,
        skip: Option<i64>,
    ) -> Result<Vec<ChatSession>> {
        self.chat_repo
            .list(owner, limit, skip)
            .await?
            .into_iter()
            .map(ChatSession::try_from)
            .collect()
    }

    async fn delete_chat(&self, chat_id: Uuid, owner: &str) -> Result<bool> {
        let id = chat_id.to_string();
        if !self.chat_repo.delete(&id, owner).await? {
            return Ok(false);
        }
        let removed = self.message_repo.delete_for_chat(&id).await?;
        tracing::debug!(chat_id = %id, messages = removed, "Chat deleted");
        Ok(true)
    }

    async fn set_chat_title(&self, chat_id: Uuid, title: &str) -> Result<()> {
        let id = chat_id.to_string();
        if self.chat_repo.set_title(&id, title).await? == 0 {
            return Err(PersistError::ChatNotFound(id));
        }
        Ok(())
    }

    async fn save_message(&self, message: ChatMessage) -> Result<()> {
        let chat_id = message.chat_id.to_string();
        if !self.chat_repo.exists(&chat_id).await? {
            return Err(PersistError::ChatNotFound(chat_id));
        }

        let position = self.message_repo.next_position(&chat_id).await?;
        self.message_repo
            .insert(MongoMessage::from_message(message, position))
            .await?;
        self.chat_repo.touch(&chat_id).await?;
        Ok(())
    }

    async fn get_messages(&self, chat_id: Uuid) -> Result<Vec<ChatMessage>> {
        self.message_repo
            .list(&chat_id.to_string())
            .await?
            .into_iter()
            .map(ChatMessage::try_from)
            .collect()
    }

    async fn delete_message(&self, message_id: Uuid) -> Result<bool> {
        self.message_repo.delete(&message_id.to_string()).await
    }

    async fn upsert_model(&self, model: ModelDeployment) -> Result<()> {
        self.model_repo.upsert(model.into()).await
    }

    async fn list_active_models(&self) -> Result<Vec<ModelDeployment>> {
        let models = self.model_repo.list_active().await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_active_model(&self, name: &str) -> Result<Option<ModelDeployment>> {
        Ok(self.model_repo.find_active(name).await?.map(Into::into))
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;
        Ok(())
    }
}
