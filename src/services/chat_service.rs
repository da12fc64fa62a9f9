use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{
            chat::{chat_id, Chat},
            ChatMessage,
        },
        dto::{request::SendFileMessageRequest, response::ConversationDto},
    },
    repositories::ChatRepository,
};

pub const IMAGE_PREVIEW: &str = "📷 Image";
pub const FILE_PREVIEW: &str = "📎 File";

/// One-to-one conversations between users.
pub struct ChatService {
    chats: Arc<dyn ChatRepository>,
}

impl ChatService {
    pub fn new(chats: Arc<dyn ChatRepository>) -> Self {
        Self { chats }
    }

    pub async fn send_message(
        &self,
        sender_id: &str,
        receiver_id: &str,
        text: &str,
    ) -> AppResult<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::ValidationError("Message text is required".into()));
        }
        ensure_distinct(sender_id, receiver_id)?;

        let id = chat_id(sender_id, receiver_id);
        let message = self
            .chats
            .insert_message(ChatMessage::new_text(&id, sender_id, text))
            .await?;
        self.touch_chat(&id, sender_id, receiver_id, text).await?;
        Ok(message)
    }

    /// The file itself is already in object storage; only its URL is kept.
    pub async fn send_file_message(
        &self,
        sender_id: &str,
        request: SendFileMessageRequest,
    ) -> AppResult<ChatMessage> {
        request.validate()?;
        ensure_distinct(sender_id, &request.receiver_id)?;

        let id = chat_id(sender_id, &request.receiver_id);
        let message = self
            .chats
            .insert_message(ChatMessage::new_file(
                &id,
                sender_id,
                &request.file_url,
                &request.file_type,
            ))
            .await?;
        self.touch_chat(
            &id,
            sender_id,
            &request.receiver_id,
            file_preview(&request.file_type),
        )
        .await?;
        Ok(message)
    }

    pub async fn update_message(
        &self,
        user_id: &str,
        chat_id: &str,
        message_id: &str,
        text: &str,
    ) -> AppResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::ValidationError("Message text is required".into()));
        }
        self.require_sender(user_id, chat_id, message_id).await?;
        self.chats
            .update_message_text(chat_id, message_id, text, Utc::now())
            .await
    }

    pub async fn delete_message(
        &self,
        user_id: &str,
        chat_id: &str,
        message_id: &str,
    ) -> AppResult<()> {
        self.require_sender(user_id, chat_id, message_id).await?;
        self.chats.delete_message(chat_id, message_id).await
    }

    /// Messages between `user_id` and `other_id`, oldest first.
    pub async fn messages(&self, user_id: &str, other_id: &str) -> AppResult<Vec<ChatMessage>> {
        self.chats.messages(&chat_id(user_id, other_id)).await
    }

    /// The user's chats, most recent first, each with its unread flag.
    pub async fn conversations(&self, user_id: &str) -> AppResult<Vec<ConversationDto>> {
        let mut chats = self.chats.find_chats_for_user(user_id).await?;
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(chats
            .into_iter()
            .map(|chat| ConversationDto {
                unread: chat.unread_for(user_id),
                chat,
            })
            .collect())
    }

    pub async fn mark_read(&self, user_id: &str, chat_id: &str) -> AppResult<()> {
        let chat = self
            .chats
            .find_chat(chat_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Chat '{}' not found", chat_id)))?;

        if !chat.participants.iter().any(|p| p == user_id) {
            return Err(AppError::Forbidden("You are not part of this chat".into()));
        }
        self.chats.mark_read(chat_id, user_id, Utc::now()).await
    }

    async fn touch_chat(
        &self,
        id: &str,
        sender_id: &str,
        receiver_id: &str,
        preview: &str,
    ) -> AppResult<()> {
        let mut participants = vec![sender_id.to_string(), receiver_id.to_string()];
        participants.sort();

        self.chats
            .upsert_chat_metadata(Chat {
                id: id.to_string(),
                participants,
                last_message: preview.to_string(),
                last_sender_id: sender_id.to_string(),
                updated_at: Utc::now(),
                last_read: HashMap::new(),
            })
            .await
    }

    async fn require_sender(&self, user_id: &str, chat_id: &str, message_id: &str) -> AppResult<()> {
        let message = self
            .chats
            .find_message(chat_id, message_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message '{}' not found", message_id)))?;

        if message.sender_id != user_id {
            return Err(AppError::Forbidden(
                "Only the sender can change a message".into(),
            ));
        }
        Ok(())
    }
}

pub fn file_preview(file_type: &str) -> &'static str {
    if file_type.starts_with("image/") {
        IMAGE_PREVIEW
    } else {
        FILE_PREVIEW
    }
}

fn ensure_distinct(sender_id: &str, receiver_id: &str) -> AppResult<()> {
    if receiver_id.trim().is_empty() {
        return Err(AppError::ValidationError("Receiver is required".into()));
    }
    if sender_id == receiver_id {
        return Err(AppError::BadRequest("Cannot start a chat with yourself".into()));
    }
    Ok(())
}
