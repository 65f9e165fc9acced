use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::dbs::mongo::models::MongoModel;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoModelRepository {
    collection: Collection<MongoModel>,
}

impl MongoModelRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("models"),
        }
    }

    pub async fn upsert(&self, model: MongoModel) -> Result<()> {
        let filter = doc! { "_id": model.name.as_str() };
        self.collection
            .replace_one(filter, &model)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn list_active(&self) -> Result<Vec<MongoModel>> {
        let models = self
            .collection
            .find(doc! { "active": true })
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(models)
    }

    pub async fn find_active(&self, name: &str) -> Result<Option<MongoModel>> {
        let filter = doc! { "_id": name, "active": true };
        Ok(self.collection.find_one(filter).await?)
    }
}
