use std::collections::HashMap;

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Chat {
    pub id: String,
    pub participants: Vec<String>,
    pub last_message: String,
    pub last_sender_id: String,
    pub updated_at: DateTime<Utc>,
    #[graphql(skip)]
    #[serde(default)]
    pub last_read: HashMap<String, DateTime<Utc>>,
}

impl Chat {
    pub fn unread_for(&self, user_id: &str) -> bool {
        if self.last_sender_id == user_id {
            return false;
        }
        match self.last_read.get(user_id) {
            Some(read_at) => *read_at < self.updated_at,
            None => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct ChatMessage {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new_text(chat_id: &str, sender_id: &str, text: &str) -> Self {
        ChatMessage {
            id: Uuid::new_v4().to_string(),
            chat_id: chat_id.to_string(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            file_url: None,
            file_type: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn new_file(chat_id: &str, sender_id: &str, file_url: &str, file_type: &str) -> Self {
        ChatMessage {
            file_url: Some(file_url.to_string()),
            file_type: Some(file_type.to_string()),
            ..ChatMessage::new_text(chat_id, sender_id, "")
        }
    }
}

/// Both participants resolve to the same chat regardless of who writes first.
pub fn chat_id(user_a: &str, user_b: &str) -> String {
    let mut ids = [user_a, user_b];
    ids.sort();
    ids.join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn chat_id_is_order_independent() {
        assert_eq!(chat_id("bob", "alice"), "alice_bob");
        assert_eq!(chat_id("alice", "bob"), "alice_bob");
    }

    #[test]
    fn unread_tracks_last_read_against_updated_at() {
        let now = Utc::now();
        let mut chat = Chat {
            id: chat_id("a", "b"),
            participants: vec!["a".into(), "b".into()],
            last_message: "hi".into(),
            last_sender_id: "a".into(),
            updated_at: now,
            last_read: HashMap::new(),
        };

        assert!(!chat.unread_for("a"));
        assert!(chat.unread_for("b"));

        chat.last_read.insert("b".into(), now + Duration::seconds(1));
        assert!(!chat.unread_for("b"));
    }

    #[test]
    fn file_message_has_empty_text() {
        let msg = ChatMessage::new_file("a_b", "a", "https://cdn/x.png", "image/png");

        assert!(msg.text.is_empty());
        assert_eq!(msg.file_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn text_message_resolves_text_field() {
        use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};

        struct Query;

        #[Object]
        impl Query {
            async fn message(&self) -> ChatMessage {
                ChatMessage::new_text("a_b", "a", "hello")
            }
        }

        let schema = Schema::new(Query, EmptyMutation, EmptySubscription);
        let response = schema.execute("{ message { text fileUrl } }").await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(data["message"]["text"], "hello");
        assert!(data["message"]["fileUrl"].is_null());
    }
}
