pub mod bookmark;
pub mod chat;
pub mod history;
pub mod question;
pub mod topic;
pub mod user;
pub use bookmark::Bookmark;
pub use chat::{Chat, ChatMessage};
pub use history::HistoryEntry;
pub use question::{Question, SeedQuestion};
pub use topic::{Topic, TopicCount};
pub use user::{UserProfile, UserRole};
