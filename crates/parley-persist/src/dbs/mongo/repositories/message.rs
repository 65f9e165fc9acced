use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::dbs::mongo::models::MongoMessage;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<MongoMessage>,
}

impl MongoMessageRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("messages"),
        }
    }

    /// Next position for a new message in the chat
    pub async fn next_position(&self, chat_id: &str) -> Result<i64> {
        let last = self
            .collection
            .find_one(doc! { "chat_id": chat_id })
            .sort(doc! { "position": -1 })
            .await?;
        Ok(last.map(|m| m.position + 1).unwrap_or(0))
    }

    pub async fn insert(&self, message: MongoMessage) -> Result<()> {
        self.collection.insert_one(&message).await?;
        Ok(())
    }

    /// All messages for a chat in position order
    pub async fn list(&self, chat_id: &str) -> Result<Vec<MongoMessage>> {
        let filter = doc! { "chat_id": chat_id };
        let messages = self
            .collection
            .find(filter)
            .sort(doc! { "position": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    pub async fn delete(&self, message_id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": message_id }).await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn delete_for_chat(&self, chat_id: &str) -> Result<u64> {
        let result = self.collection.delete_many(doc! { "chat_id": chat_id }).await?;
        Ok(result.deleted_count)
    }
}
