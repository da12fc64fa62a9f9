pub mod bookmark_service;
pub mod chat_service;
pub mod question_bank;
pub mod question_service;
pub mod quiz_session;
pub mod quiz_session_service;
pub mod seed_source;
pub mod session_timer;
pub mod topic_service;
pub mod user_service;
