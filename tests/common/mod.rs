#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quizzes_server::{
    app_state::{AppState, Repositories},
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{
        Bookmark, Chat, ChatMessage, HistoryEntry, Question, SeedQuestion, Topic, UserProfile,
    },
    repositories::{
        BookmarkRepository, ChatRepository, HistoryRepository, QuestionRepository,
        TopicRepository, UserRepository,
    },
    services::seed_source::StaticSeedSource,
};

#[derive(Default)]
pub struct InMemoryQuestionRepository {
    pub questions: RwLock<Vec<Question>>,
    pub unavailable: bool,
}

impl InMemoryQuestionRepository {
    pub fn with(questions: Vec<Question>) -> Self {
        Self {
            questions: RwLock::new(questions),
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            questions: RwLock::new(Vec::new()),
            unavailable: true,
        }
    }

    fn check(&self) -> AppResult<()> {
        if self.unavailable {
            return Err(AppError::DatabaseError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn find_by_topic(&self, topic: &str) -> AppResult<Vec<Question>> {
        self.check()?;
        let questions = self.questions.read().await;
        Ok(questions.iter().filter(|q| q.topic == topic).cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        self.check()?;
        let questions = self.questions.read().await;
        Ok(questions.iter().find(|q| q.id == id).cloned())
    }

    async fn count_by_topic(&self, topic: &str) -> AppResult<i64> {
        self.check()?;
        let questions = self.questions.read().await;
        Ok(questions.iter().filter(|q| q.topic == topic).count() as i64)
    }

    async fn insert(&self, question: Question) -> AppResult<Question> {
        self.check()?;
        let mut questions = self.questions.write().await;
        if questions.iter().any(|q| q.id == question.id) {
            return Err(AppError::AlreadyExists(question.id));
        }
        questions.push(question.clone());
        Ok(question)
    }

    async fn update(&self, question: Question) -> AppResult<Question> {
        self.check()?;
        let mut questions = self.questions.write().await;
        let slot = questions
            .iter_mut()
            .find(|q| q.id == question.id)
            .ok_or_else(|| AppError::NotFound(question.id.clone()))?;
        *slot = question.clone();
        Ok(question)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.check()?;
        let mut questions = self.questions.write().await;
        let before = questions.len();
        questions.retain(|q| q.id != id);
        if questions.len() == before {
            return Err(AppError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryTopicRepository {
    topics: RwLock<Vec<Topic>>,
}

#[async_trait]
impl TopicRepository for InMemoryTopicRepository {
    async fn find_all(&self) -> AppResult<Vec<Topic>> {
        Ok(self.topics.read().await.clone())
    }

    async fn insert(&self, topic: Topic) -> AppResult<Topic> {
        self.topics.write().await.push(topic.clone());
        Ok(topic)
    }

    async fn delete_by_name(&self, name: &str) -> AppResult<u64> {
        let mut topics = self.topics.write().await;
        let before = topics.len();
        topics.retain(|t| t.name != name);
        Ok((before - topics.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    pub users: RwLock<HashMap<String, UserProfile>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<UserProfile>> {
        Ok(self.users.read().await.get(uid).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<UserProfile>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn create(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let mut users = self.users.write().await;
        if users.contains_key(&profile.uid) {
            return Err(AppError::AlreadyExists(profile.uid));
        }
        users.insert(profile.uid.clone(), profile.clone());
        Ok(profile)
    }

    async fn update(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let mut users = self.users.write().await;
        if !users.contains_key(&profile.uid) {
            return Err(AppError::NotFound(profile.uid));
        }
        users.insert(profile.uid.clone(), profile.clone());
        Ok(profile)
    }

    async fn delete(&self, uid: &str) -> AppResult<()> {
        self.users
            .write()
            .await
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(uid.to_string()))
    }

    async fn touch_last_seen(&self, uid: &str, email: &str, at: DateTime<Utc>) -> AppResult<()> {
        let mut users = self.users.write().await;
        let profile = users
            .entry(uid.to_string())
            .or_insert_with(|| UserProfile::new(uid, email));
        profile.last_seen = Some(at);
        Ok(())
    }

    async fn add_to_total_score(&self, uid: &str, points: i64) -> AppResult<()> {
        let mut users = self.users.write().await;
        let profile = users
            .get_mut(uid)
            .ok_or_else(|| AppError::NotFound(uid.to_string()))?;
        profile.total_score += points;
        Ok(())
    }

    async fn top_by_total_score(&self, limit: i64) -> AppResult<Vec<UserProfile>> {
        let mut users: Vec<_> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        users.truncate(limit.max(0) as usize);
        Ok(users)
    }
}

#[derive(Default)]
pub struct InMemoryHistoryRepository {
    pub entries: RwLock<Vec<HistoryEntry>>,
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn create(&self, entry: HistoryEntry) -> AppResult<HistoryEntry> {
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<HistoryEntry>> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn delete(&self, user_id: &str, id: &str) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| !(e.user_id == user_id && e.id == id));
        if entries.len() == before {
            return Err(AppError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryBookmarkRepository {
    bookmarks: RwLock<HashMap<String, Bookmark>>,
}

#[async_trait]
impl BookmarkRepository for InMemoryBookmarkRepository {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<Bookmark>> {
        Ok(self
            .bookmarks
            .read()
            .await
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Bookmark>> {
        Ok(self.bookmarks.read().await.get(id).cloned())
    }

    async fn insert(&self, bookmark: Bookmark) -> AppResult<Bookmark> {
        self.bookmarks
            .write()
            .await
            .insert(bookmark.id.clone(), bookmark.clone());
        Ok(bookmark)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.bookmarks.write().await.remove(id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryChatRepository {
    chats: RwLock<HashMap<String, Chat>>,
    messages: RwLock<Vec<ChatMessage>>,
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn find_chat(&self, chat_id: &str) -> AppResult<Option<Chat>> {
        Ok(self.chats.read().await.get(chat_id).cloned())
    }

    async fn find_chats_for_user(&self, user_id: &str) -> AppResult<Vec<Chat>> {
        let mut chats: Vec<_> = self
            .chats
            .read()
            .await
            .values()
            .filter(|c| c.participants.iter().any(|p| p == user_id))
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    async fn upsert_chat_metadata(&self, chat: Chat) -> AppResult<()> {
        let mut chats = self.chats.write().await;
        let last_read = chats
            .get(&chat.id)
            .map(|existing| existing.last_read.clone())
            .unwrap_or_default();
        chats.insert(chat.id.clone(), Chat { last_read, ..chat });
        Ok(())
    }

    async fn mark_read(&self, chat_id: &str, user_id: &str, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(chat) = self.chats.write().await.get_mut(chat_id) {
            chat.last_read.insert(user_id.to_string(), at);
        }
        Ok(())
    }

    async fn insert_message(&self, message: ChatMessage) -> AppResult<ChatMessage> {
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn find_message(&self, chat_id: &str, id: &str) -> AppResult<Option<ChatMessage>> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .find(|m| m.chat_id == chat_id && m.id == id)
            .cloned())
    }

    async fn update_message_text(
        &self,
        chat_id: &str,
        id: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut messages = self.messages.write().await;
        let message = messages
            .iter_mut()
            .find(|m| m.chat_id == chat_id && m.id == id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        message.text = text.to_string();
        message.updated_at = Some(at);
        Ok(())
    }

    async fn delete_message(&self, chat_id: &str, id: &str) -> AppResult<()> {
        self.messages
            .write()
            .await
            .retain(|m| !(m.chat_id == chat_id && m.id == id));
        Ok(())
    }

    async fn messages(&self, chat_id: &str) -> AppResult<Vec<ChatMessage>> {
        let mut messages: Vec<_> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }
}

pub fn seed(text: &str, answer: &str) -> SeedQuestion {
    SeedQuestion {
        question: text.to_string(),
        options: vec![
            answer.to_string(),
            format!("not {}", answer),
            format!("maybe {}", answer),
            format!("never {}", answer),
        ],
        answer: answer.to_string(),
    }
}

pub fn rust_seeds() -> Vec<SeedQuestion> {
    vec![
        seed("What does the borrow checker enforce?", "Aliasing rules"),
        seed("Which trait enables `?` on a type?", "Try"),
    ]
}

/// Handles to the in-memory stores behind a test `AppState`.
pub struct TestStores {
    pub questions: Arc<InMemoryQuestionRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub history: Arc<InMemoryHistoryRepository>,
}

pub fn test_state(questions: InMemoryQuestionRepository) -> (AppState, TestStores) {
    let questions = Arc::new(questions);
    let users = Arc::new(InMemoryUserRepository::default());
    let history = Arc::new(InMemoryHistoryRepository::default());

    let repositories = Repositories {
        questions: questions.clone(),
        topics: Arc::new(InMemoryTopicRepository::default()),
        users: users.clone(),
        history: history.clone(),
        bookmarks: Arc::new(InMemoryBookmarkRepository::default()),
        chats: Arc::new(InMemoryChatRepository::default()),
    };
    let seeds = Arc::new(StaticSeedSource::new().with_topic("Rust", rust_seeds()));

    let mut config = Config::from_env();
    config.admin_email = "admin@example.com".to_string();

    let state = AppState::from_parts(config, repositories, seeds);
    (
        state,
        TestStores {
            questions,
            users,
            history,
        },
    )
}
