use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::question::Question;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub question: Question,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(user_id: &str, question: Question) -> Self {
        Bookmark {
            id: bookmark_id(user_id, &question.id),
            user_id: user_id.to_string(),
            question,
            created_at: Utc::now(),
        }
    }
}

/// A user bookmarks a given question at most once.
pub fn bookmark_id(user_id: &str, question_id: &str) -> String {
    format!("{}:{}", user_id, question_id)
}
