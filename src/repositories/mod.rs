pub mod bookmark_repository;
pub mod chat_repository;
pub mod history_repository;
pub mod question_repository;
pub mod topic_repository;
pub mod user_repository;

pub use bookmark_repository::{BookmarkRepository, MongoBookmarkRepository};
pub use chat_repository::{ChatRepository, MongoChatRepository};
pub use history_repository::{HistoryRepository, MongoHistoryRepository};
pub use question_repository::{MongoQuestionRepository, QuestionRepository};
pub use topic_repository::{MongoTopicRepository, TopicRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
