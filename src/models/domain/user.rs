use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Enum, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

/// Profile document keyed by the identity provider's user id.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub total_score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(uid: &str, email: &str) -> Self {
        UserProfile {
            uid: uid.to_string(),
            email: email.to_string(),
            display_name: None,
            photo_url: None,
            total_score: 0,
            last_seen: None,
            created_at: Some(Utc::now()),
        }
    }

    /// Name shown on results and the leaderboard.
    pub fn public_name(&self) -> String {
        self.display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                self.email
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            })
    }
}

#[cfg(test)]
impl UserProfile {
    pub fn test_profile(uid: &str) -> Self {
        UserProfile::new(uid, &format!("{}@example.com", uid))
    }
}
