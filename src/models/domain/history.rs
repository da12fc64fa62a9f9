use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One finished quiz attempt in a user's history.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct HistoryEntry {
    pub id: String,
    pub user_id: String,
    pub topic: String,
    pub score: i64,
    pub total_questions: i64,
    pub date: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(user_id: &str, topic: &str, score: i64, total_questions: i64) -> Self {
        HistoryEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            topic: topic.to_string(),
            score,
            total_questions,
            date: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_entry_round_trip_preserves_score_fields() {
        let entry = HistoryEntry::new("user-1", "Rust", 15, 4);

        let json = serde_json::to_string(&entry).expect("entry should serialize");
        let parsed: HistoryEntry = serde_json::from_str(&json).expect("entry should deserialize");

        assert_eq!(parsed, entry);
    }
}
