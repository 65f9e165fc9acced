use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::dbs::mongo::models::MongoChat;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoChatRepository {
    collection: Collection<MongoChat>,
}

impl MongoChatRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("chats"),
        }
    }

    pub async fn insert(&self, chat: MongoChat) -> Result<MongoChat> {
        self.collection.insert_one(&chat).await?;
        Ok(chat)
    }

    pub async fn find(&self, chat_id: &str, owner: &str) -> Result<Option<MongoChat>> {
        let filter = doc! { "_id": chat_id, "owner": owner };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn exists(&self, chat_id: &str) -> Result<bool> {
        let filter = doc! { "_id": chat_id };
        Ok(self.collection.count_documents(filter).await? > 0)
    }

    /// Chats for an owner, most recently updated first
    pub async fn list(
        &self,
        owner: &str,
        limit: Option<i64>,
        skip: Option<i64>,
    ) -> Result<Vec<MongoChat>> {
        let filter = doc! { "owner": owner };
        let mut find = self
            .collection
            .find(filter)
            .sort(doc! { "updated_at": -1, "_id": -1 });

        if let Some(limit) = limit {
            find = find.limit(limit);
        }
        if let Some(skip) = skip {
            find = find.skip(u64::try_from(skip).unwrap_or(0));
        }

        Ok(find.await?.try_collect().await?)
    }

    pub async fn delete(&self, chat_id: &str, owner: &str) -> Result<bool> {
        let filter = doc! { "_id": chat_id, "owner": owner };
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn set_title(&self, chat_id: &str, title: &str) -> Result<u64> {
        let filter = doc! { "_id": chat_id };
        let update = doc! { "$set": { "title": title } };
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count)
    }

    /// Touch chat (update updated_at)
    pub async fn touch(&self, chat_id: &str) -> Result<()> {
        let filter = doc! { "_id": chat_id };
        let now = bson::DateTime::from_chrono(Utc::now());
        let update = doc! { "$set": { "updated_at": now } };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }
}
