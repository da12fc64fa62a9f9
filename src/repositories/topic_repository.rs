use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection};

use crate::{
    db::{collections, Database},
    errors::AppResult,
    models::domain::Topic,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TopicRepository: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Topic>>;
    async fn insert(&self, topic: Topic) -> AppResult<Topic>;
    /// Removes every topic document with exactly this name.
    async fn delete_by_name(&self, name: &str) -> AppResult<u64>;
}

pub struct MongoTopicRepository {
    collection: Collection<Topic>,
}

impl MongoTopicRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::TOPICS);
        Self { collection }
    }
}

#[async_trait]
impl TopicRepository for MongoTopicRepository {
    async fn find_all(&self) -> AppResult<Vec<Topic>> {
        let cursor = self.collection.find(doc! {}).await?;
        let topics: Vec<Topic> = cursor.try_collect().await?;
        Ok(topics)
    }

    async fn insert(&self, topic: Topic) -> AppResult<Topic> {
        self.collection.insert_one(&topic).await?;
        Ok(topic)
    }

    async fn delete_by_name(&self, name: &str) -> AppResult<u64> {
        let result = self.collection.delete_many(doc! { "name": name }).await?;
        Ok(result.deleted_count)
    }
}
