use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        BookmarkRepository, ChatRepository, HistoryRepository, MongoBookmarkRepository,
        MongoChatRepository, MongoHistoryRepository, MongoQuestionRepository,
        MongoTopicRepository, MongoUserRepository, QuestionRepository, TopicRepository,
        UserRepository,
    },
    services::{
        bookmark_service::BookmarkService,
        chat_service::ChatService,
        question_bank::QuestionBank,
        question_service::QuestionService,
        quiz_session_service::{QuizSessionService, ScoreSink},
        seed_source::{JsonSeedSource, SeedSource},
        topic_service::TopicService,
        user_service::UserService,
    },
};

/// Storage backends the services are built on.
pub struct Repositories {
    pub questions: Arc<dyn QuestionRepository>,
    pub topics: Arc<dyn TopicRepository>,
    pub users: Arc<dyn UserRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub bookmarks: Arc<dyn BookmarkRepository>,
    pub chats: Arc<dyn ChatRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub question_service: Arc<QuestionService>,
    pub topic_service: Arc<TopicService>,
    pub user_service: Arc<UserService>,
    pub session_service: Arc<QuizSessionService>,
    pub bookmark_service: Arc<BookmarkService>,
    pub chat_service: Arc<ChatService>,
    pub jwt_service: Arc<JwtService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config, db: &Database) -> AppResult<Self> {
        let questions = MongoQuestionRepository::new(db);
        questions.ensure_indexes().await?;
        let users = MongoUserRepository::new(db);
        users.ensure_indexes().await?;
        let history = MongoHistoryRepository::new(db);
        history.ensure_indexes().await?;
        let chats = MongoChatRepository::new(db);
        chats.ensure_indexes().await?;

        let repositories = Repositories {
            questions: Arc::new(questions),
            topics: Arc::new(MongoTopicRepository::new(db)),
            users: Arc::new(users),
            history: Arc::new(history),
            bookmarks: Arc::new(MongoBookmarkRepository::new(db)),
            chats: Arc::new(chats),
        };
        let seeds = Arc::new(JsonSeedSource::new(&config.seed_dir));

        Ok(Self::from_parts(config, repositories, seeds))
    }

    pub fn from_parts(
        config: Config,
        repositories: Repositories,
        seeds: Arc<dyn SeedSource>,
    ) -> Self {
        let bank = Arc::new(QuestionBank::new(
            Arc::clone(&repositories.questions),
            Arc::clone(&seeds),
        ));

        let user_service = Arc::new(UserService::new(
            repositories.users,
            repositories.history,
            config.leaderboard_size,
        ));
        let sink: Arc<dyn ScoreSink> = user_service.clone();

        Self {
            question_service: Arc::new(QuestionService::new(
                Arc::clone(&repositories.questions),
                Arc::clone(&bank),
            )),
            topic_service: Arc::new(TopicService::new(
                repositories.topics,
                repositories.questions,
                seeds,
            )),
            session_service: Arc::new(
                QuizSessionService::new(bank, sink)
                    .with_idle_timeout(config.session_idle_timeout()),
            ),
            user_service,
            bookmark_service: Arc::new(BookmarkService::new(repositories.bookmarks)),
            chat_service: Arc::new(ChatService::new(repositories.chats)),
            jwt_service: Arc::new(JwtService::new(
                &config.jwt_secret,
                config.jwt_expiration_hours,
                &config.admin_email,
            )),
            config: Arc::new(config),
        }
    }
}
