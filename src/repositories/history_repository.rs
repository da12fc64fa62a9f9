use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{collections, Database},
    errors::{AppError, AppResult},
    models::domain::HistoryEntry,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn create(&self, entry: HistoryEntry) -> AppResult<HistoryEntry>;
    /// Newest first.
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<HistoryEntry>>;
    async fn delete(&self, user_id: &str, id: &str) -> AppResult<()>;
}

pub struct MongoHistoryRepository {
    collection: Collection<HistoryEntry>,
}

impl MongoHistoryRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::HISTORY);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let user_date_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "date": -1 })
            .options(IndexOptions::builder().name("user_date".to_string()).build())
            .build();

        self.collection.create_index(user_date_index).await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryRepository for MongoHistoryRepository {
    async fn create(&self, entry: HistoryEntry) -> AppResult<HistoryEntry> {
        self.collection.insert_one(&entry).await?;
        Ok(entry)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<HistoryEntry>> {
        let entries = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "date": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(entries)
    }

    async fn delete(&self, user_id: &str, id: &str) -> AppResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "user_id": user_id, "id": id })
            .await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "History entry '{}' not found",
                id
            )));
        }
        Ok(())
    }
}
