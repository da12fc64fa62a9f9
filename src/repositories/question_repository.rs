use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::{collections, Database},
    errors::{AppError, AppResult},
    models::domain::Question,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Questions of a topic in insertion order.
    async fn find_by_topic(&self, topic: &str) -> AppResult<Vec<Question>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>>;
    async fn count_by_topic(&self, topic: &str) -> AppResult<i64>;
    async fn insert(&self, question: Question) -> AppResult<Question>;
    async fn update(&self, question: Question) -> AppResult<Question>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct MongoQuestionRepository {
    collection: Collection<Question>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::QUESTIONS);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quizzes collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let topic_index = IndexModel::builder()
            .keys(doc! { "topic": 1 })
            .options(IndexOptions::builder().name("topic".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(topic_index).await?;

        log::info!("Successfully created indexes for quizzes collection");
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn find_by_topic(&self, topic: &str) -> AppResult<Vec<Question>> {
        let questions = self
            .collection
            .find(doc! { "topic": topic })
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        let question = self.collection.find_one(doc! { "id": id }).await?;
        Ok(question)
    }

    async fn count_by_topic(&self, topic: &str) -> AppResult<i64> {
        let count = self
            .collection
            .count_documents(doc! { "topic": topic })
            .await?;
        Ok(count as i64)
    }

    async fn insert(&self, question: Question) -> AppResult<Question> {
        self.collection.insert_one(&question).await?;
        Ok(question)
    }

    async fn update(&self, question: Question) -> AppResult<Question> {
        let update = doc! {
            "$set": {
                "question": &question.question,
                "options": to_bson(&question.options)?,
                "answer": &question.answer,
                "topic": &question.topic,
            }
        };

        let result = self
            .collection
            .update_one(doc! { "id": &question.id }, update)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                question.id
            )));
        }
        Ok(question)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                id
            )));
        }
        Ok(())
    }
}
