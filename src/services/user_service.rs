use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{HistoryEntry, UserProfile},
        dto::{
            request::{AdminCreateUserRequest, AdminUpdateUserRequest, UpdateProfileRequest},
            response::LeaderboardEntry,
        },
    },
    repositories::{HistoryRepository, UserRepository},
    services::{quiz_session::QuizOutcome, quiz_session_service::ScoreSink},
};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    history: Arc<dyn HistoryRepository>,
    leaderboard_size: i64,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        history: Arc<dyn HistoryRepository>,
        leaderboard_size: i64,
    ) -> Self {
        Self {
            users,
            history,
            leaderboard_size,
        }
    }

    pub async fn touch_last_seen(&self, uid: &str, email: &str) -> AppResult<()> {
        self.users.touch_last_seen(uid, email, Utc::now()).await
    }

    pub async fn get_profile(&self, uid: &str) -> AppResult<UserProfile> {
        self.users
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with uid '{}' not found", uid)))
    }

    pub async fn update_profile(
        &self,
        uid: &str,
        request: UpdateProfileRequest,
    ) -> AppResult<UserProfile> {
        request.validate()?;

        let mut profile = self.get_profile(uid).await?;
        if let Some(display_name) = request.display_name {
            profile.display_name = Some(display_name);
        }
        if let Some(photo_url) = request.photo_url {
            profile.photo_url = Some(photo_url);
        }

        self.users.update(profile).await
    }

    pub async fn list_users(&self) -> AppResult<Vec<UserProfile>> {
        self.users.find_all().await
    }

    pub async fn admin_add_user(&self, request: AdminCreateUserRequest) -> AppResult<UserProfile> {
        request.validate()?;

        let mut profile = UserProfile::new(&request.uid, &request.email);
        profile.display_name = request.display_name;
        self.users.create(profile).await
    }

    pub async fn admin_update_user(
        &self,
        uid: &str,
        request: AdminUpdateUserRequest,
    ) -> AppResult<UserProfile> {
        request.validate()?;

        let mut profile = self.get_profile(uid).await?;
        if let Some(display_name) = request.display_name {
            profile.display_name = Some(display_name);
        }
        if let Some(photo_url) = request.photo_url {
            profile.photo_url = Some(photo_url);
        }
        if let Some(total_score) = request.total_score {
            profile.total_score = total_score;
        }

        self.users.update(profile).await
    }

    pub async fn delete_user(&self, uid: &str) -> AppResult<()> {
        self.users.delete(uid).await
    }

    pub async fn history(&self, uid: &str) -> AppResult<Vec<HistoryEntry>> {
        self.history.find_by_user(uid).await
    }

    pub async fn delete_history_item(&self, uid: &str, id: &str) -> AppResult<()> {
        self.history.delete(uid, id).await
    }

    /// Highest total scores first. Profiles that never scored count as 0.
    pub async fn leaderboard(&self, limit: Option<i64>) -> AppResult<Vec<LeaderboardEntry>> {
        let limit = limit.unwrap_or(self.leaderboard_size).clamp(1, 100);

        let mut profiles = self.users.top_by_total_score(limit).await?;
        profiles.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        profiles.truncate(limit as usize);

        Ok(profiles
            .iter()
            .enumerate()
            .map(|(i, profile)| LeaderboardEntry::ranked(i + 1, profile))
            .collect())
    }
}

#[async_trait]
impl ScoreSink for UserService {
    async fn record_result(&self, user_id: &str, outcome: &QuizOutcome) -> AppResult<()> {
        let entry = HistoryEntry::new(user_id, &outcome.topic, outcome.score, outcome.question_count);
        self.history.create(entry).await?;

        match self.users.add_to_total_score(user_id, outcome.score).await {
            Ok(()) => Ok(()),
            // History is written; a user without a profile simply has no total.
            Err(AppError::NotFound(_)) => {
                log::debug!("No profile for '{}', total score not updated", user_id);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
