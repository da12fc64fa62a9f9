use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection};

use crate::{
    db::{collections, Database},
    errors::AppResult,
    models::domain::Bookmark,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<Bookmark>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Bookmark>>;
    async fn insert(&self, bookmark: Bookmark) -> AppResult<Bookmark>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct MongoBookmarkRepository {
    collection: Collection<Bookmark>,
}

impl MongoBookmarkRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::BOOKMARKS);
        Self { collection }
    }
}

#[async_trait]
impl BookmarkRepository for MongoBookmarkRepository {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<Bookmark>> {
        let bookmarks = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(bookmarks)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Bookmark>> {
        let bookmark = self.collection.find_one(doc! { "id": id }).await?;
        Ok(bookmark)
    }

    async fn insert(&self, bookmark: Bookmark) -> AppResult<Bookmark> {
        self.collection.insert_one(&bookmark).await?;
        Ok(bookmark)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.collection.delete_one(doc! { "id": id }).await?;
        Ok(())
    }
}
