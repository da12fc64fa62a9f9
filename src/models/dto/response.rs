use async_graphql::{ComplexObject, Enum, SimpleObject};
use serde::Serialize;

use crate::{
    models::domain::{Chat, Question, UserProfile},
    services::quiz_session::SessionSnapshot,
};

/// Non-fatal conditions reported next to a successful result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum Warning {
    /// Questions could not be read from the store; only the seed list is shown.
    StoreUnavailable,
    /// The topic has no questions at all.
    EmptyTopic,
    /// The finished session could not be written to history.
    ResultNotSaved,
}

impl Warning {
    pub fn message(&self) -> &'static str {
        match self {
            Warning::StoreUnavailable => "Saved questions could not be loaded, showing built-in questions only",
            Warning::EmptyTopic => "This topic has no questions yet. An admin can add some from the dashboard",
            Warning::ResultNotSaved => "Your result could not be saved",
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[graphql(complex)]
pub struct QuestionList {
    pub topic: String,
    pub questions: Vec<Question>,
    pub warnings: Vec<Warning>,
}

#[ComplexObject]
impl QuestionList {
    /// Display text for each warning, in the same order.
    async fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.message().to_string()).collect()
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct SessionResponse {
    pub session: SessionSnapshot,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject)]
pub struct ImportSummary {
    pub imported: i64,
    pub skipped: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub uid: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub total_score: i64,
}

impl LeaderboardEntry {
    pub fn ranked(rank: usize, profile: &UserProfile) -> Self {
        LeaderboardEntry {
            rank: rank as i64,
            uid: profile.uid.clone(),
            name: profile.public_name(),
            photo_url: profile.photo_url.clone(),
            total_score: profile.total_score,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Enum)]
pub enum BookmarkToggle {
    Added,
    Removed,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct ConversationDto {
    pub chat: Chat,
    pub unread: bool,
}

#[derive(Debug, Serialize, SimpleObject)]
pub struct DeleteResponse {
    pub message: String,
}

impl DeleteResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
