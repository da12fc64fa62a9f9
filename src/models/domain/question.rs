use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Id namespace for questions that only exist in a seed file. The store issues
/// UUIDs, so ids with this prefix never collide with stored ones.
pub const SEED_ID_PREFIX: &str = "seed_";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Question {
    pub fn new(topic: &str, question: &str, options: Vec<String>, answer: &str) -> Self {
        Question {
            id: Uuid::new_v4().to_string(),
            question: question.to_string(),
            options,
            answer: answer.to_string(),
            topic: topic.to_string(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn normalized_text(&self) -> String {
        normalize_question_text(&self.question)
    }

    pub fn is_seed_only(&self) -> bool {
        self.id.starts_with(SEED_ID_PREFIX)
    }
}

/// One record of a per-topic seed file: `[{ "question", "options", "answer" }, ...]`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SeedQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub answer: String,
}

impl SeedQuestion {
    pub fn normalized_text(&self) -> String {
        normalize_question_text(&self.question)
    }

    /// Question as shown to a session before it has been backfilled.
    pub fn to_display_question(&self, topic: &str) -> Question {
        Question {
            id: seed_question_id(&self.normalized_text()),
            question: self.question.clone(),
            options: self.options.clone(),
            answer: self.answer.clone(),
            topic: topic.to_string(),
            created_at: None,
        }
    }

    /// Question as written to the store by the backfill.
    pub fn to_stored_question(&self, topic: &str) -> Question {
        Question::new(topic, &self.question, self.options.clone(), &self.answer)
    }
}

/// Trim and case-fold. Punctuation is kept.
pub fn normalize_question_text(text: &str) -> String {
    text.trim().to_lowercase()
}

pub fn seed_question_id(normalized_text: &str) -> String {
    let digest = Sha256::digest(normalized_text.as_bytes());
    let hex: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    format!("{}{}", SEED_ID_PREFIX, hex)
}
