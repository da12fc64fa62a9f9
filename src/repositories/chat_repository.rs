use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::{collections, Database},
    errors::{AppError, AppResult},
    models::domain::{Chat, ChatMessage},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn find_chat(&self, chat_id: &str) -> AppResult<Option<Chat>>;
    /// Chats the user takes part in, most recently updated first.
    async fn find_chats_for_user(&self, user_id: &str) -> AppResult<Vec<Chat>>;
    /// Writes participants and last-message metadata, keeping read markers.
    async fn upsert_chat_metadata(&self, chat: Chat) -> AppResult<()>;
    async fn mark_read(&self, chat_id: &str, user_id: &str, at: DateTime<Utc>) -> AppResult<()>;
    async fn insert_message(&self, message: ChatMessage) -> AppResult<ChatMessage>;
    async fn find_message(&self, chat_id: &str, id: &str) -> AppResult<Option<ChatMessage>>;
    async fn update_message_text(
        &self,
        chat_id: &str,
        id: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> AppResult<()>;
    async fn delete_message(&self, chat_id: &str, id: &str) -> AppResult<()>;
    /// Oldest first.
    async fn messages(&self, chat_id: &str) -> AppResult<Vec<ChatMessage>>;
}

pub struct MongoChatRepository {
    chats: Collection<Chat>,
    messages: Collection<ChatMessage>,
}

impl MongoChatRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            chats: db.get_collection(collections::CHATS),
            messages: db.get_collection(collections::MESSAGES),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let participants_index = IndexModel::builder()
            .keys(doc! { "participants": 1, "updated_at": -1 })
            .options(IndexOptions::builder().name("participants_updated".to_string()).build())
            .build();

        let chat_messages_index = IndexModel::builder()
            .keys(doc! { "chat_id": 1, "created_at": 1 })
            .options(IndexOptions::builder().name("chat_created".to_string()).build())
            .build();

        self.chats.create_index(participants_index).await?;
        self.messages.create_index(chat_messages_index).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatRepository for MongoChatRepository {
    async fn find_chat(&self, chat_id: &str) -> AppResult<Option<Chat>> {
        let chat = self.chats.find_one(doc! { "id": chat_id }).await?;
        Ok(chat)
    }

    async fn find_chats_for_user(&self, user_id: &str) -> AppResult<Vec<Chat>> {
        let chats = self
            .chats
            .find(doc! { "participants": user_id })
            .sort(doc! { "updated_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(chats)
    }

    async fn upsert_chat_metadata(&self, chat: Chat) -> AppResult<()> {
        self.chats
            .update_one(
                doc! { "id": &chat.id },
                doc! {
                    "$set": {
                        "participants": to_bson(&chat.participants)?,
                        "last_message": &chat.last_message,
                        "last_sender_id": &chat.last_sender_id,
                        "updated_at": to_bson(&chat.updated_at)?,
                    },
                    "$setOnInsert": { "id": &chat.id, "last_read": {} },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn mark_read(&self, chat_id: &str, user_id: &str, at: DateTime<Utc>) -> AppResult<()> {
        let field = format!("last_read.{}", user_id);
        let mut set = doc! {};
        set.insert(field, to_bson(&at)?);

        self.chats
            .update_one(doc! { "id": chat_id }, doc! { "$set": set })
            .await?;
        Ok(())
    }

    async fn insert_message(&self, message: ChatMessage) -> AppResult<ChatMessage> {
        self.messages.insert_one(&message).await?;
        Ok(message)
    }

    async fn find_message(&self, chat_id: &str, id: &str) -> AppResult<Option<ChatMessage>> {
        let message = self
            .messages
            .find_one(doc! { "chat_id": chat_id, "id": id })
            .await?;
        Ok(message)
    }

    async fn update_message_text(
        &self,
        chat_id: &str,
        id: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = self
            .messages
            .update_one(
                doc! { "chat_id": chat_id, "id": id },
                doc! { "$set": { "text": text, "updated_at": to_bson(&at)? } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Message '{}' not found", id)));
        }
        Ok(())
    }

    async fn delete_message(&self, chat_id: &str, id: &str) -> AppResult<()> {
        let result = self
            .messages
            .delete_one(doc! { "chat_id": chat_id, "id": id })
            .await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Message '{}' not found", id)));
        }
        Ok(())
    }

    async fn messages(&self, chat_id: &str) -> AppResult<Vec<ChatMessage>> {
        let messages = self
            .messages
            .find(doc! { "chat_id": chat_id })
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }
}
