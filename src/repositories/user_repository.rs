use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{collections, Database},
    errors::{AppError, AppResult},
    models::domain::UserProfile,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<UserProfile>>;
    async fn find_all(&self) -> AppResult<Vec<UserProfile>>;
    async fn create(&self, profile: UserProfile) -> AppResult<UserProfile>;
    async fn update(&self, profile: UserProfile) -> AppResult<UserProfile>;
    async fn delete(&self, uid: &str) -> AppResult<()>;
    /// Creates the profile on first sight, then stamps `last_seen`.
    async fn touch_last_seen(&self, uid: &str, email: &str, at: DateTime<Utc>) -> AppResult<()>;
    async fn add_to_total_score(&self, uid: &str, points: i64) -> AppResult<()>;
    async fn top_by_total_score(&self, limit: i64) -> AppResult<Vec<UserProfile>>;
}

pub struct MongoUserRepository {
    collection: Collection<UserProfile>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::USERS);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let uid_index = IndexModel::builder()
            .keys(doc! { "uid": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("uid_unique".to_string())
                    .build(),
            )
            .build();

        let score_index = IndexModel::builder()
            .keys(doc! { "total_score": -1 })
            .options(IndexOptions::builder().name("total_score".to_string()).build())
            .build();

        self.collection.create_index(uid_index).await?;
        self.collection.create_index(score_index).await?;
        log::info!("Created indexes for users collection");

        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<UserProfile>> {
        let profile = self.collection.find_one(doc! { "uid": uid }).await?;
        Ok(profile)
    }

    async fn find_all(&self) -> AppResult<Vec<UserProfile>> {
        let cursor = self.collection.find(doc! {}).await?;
        let users: Vec<UserProfile> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn create(&self, profile: UserProfile) -> AppResult<UserProfile> {
        if self.find_by_uid(&profile.uid).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "User with uid '{}' already exists",
                profile.uid
            )));
        }
        self.collection.insert_one(&profile).await?;
        Ok(profile)
    }

    async fn update(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "uid": &profile.uid }, &profile)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "User with uid '{}' not found",
                profile.uid
            )));
        }
        Ok(profile)
    }

    async fn delete(&self, uid: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "uid": uid }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "User with uid '{}' not found",
                uid
            )));
        }
        Ok(())
    }

    async fn touch_last_seen(&self, uid: &str, email: &str, at: DateTime<Utc>) -> AppResult<()> {
        let at = to_bson(&at)?;
        self.collection
            .update_one(
                doc! { "uid": uid },
                doc! {
                    "$set": { "last_seen": at.clone() },
                    "$setOnInsert": {
                        "uid": uid,
                        "email": email,
                        "total_score": 0_i64,
                        "created_at": at,
                    },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn add_to_total_score(&self, uid: &str, points: i64) -> AppResult<()> {
        let result = self
            .collection
            .update_one(doc! { "uid": uid }, doc! { "$inc": { "total_score": points } })
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "User with uid '{}' not found",
                uid
            )));
        }
        Ok(())
    }

    async fn top_by_total_score(&self, limit: i64) -> AppResult<Vec<UserProfile>> {
        let users = self
            .collection
            .find(doc! {})
            .sort(doc! { "total_score": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }
}
