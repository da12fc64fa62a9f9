pub mod mutations;
pub mod queries;

use async_graphql::{EmptySubscription, Schema as GraphQLSchema};

use crate::app_state::AppState;

pub use mutations::MutationRoot;
pub use queries::QueryRoot;

pub type Schema = GraphQLSchema<QueryRoot, MutationRoot, EmptySubscription>;

const MAX_QUERY_DEPTH: usize = 8;

pub fn create_schema(app_state: AppState) -> Schema {
    GraphQLSchema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(app_state)
        .limit_depth(MAX_QUERY_DEPTH)
        .finish()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        app_state::Repositories,
        config::Config,
        repositories::{
            bookmark_repository::MockBookmarkRepository, chat_repository::MockChatRepository,
            history_repository::MockHistoryRepository,
            question_repository::MockQuestionRepository, topic_repository::MockTopicRepository,
            user_repository::MockUserRepository,
        },
        services::seed_source::StaticSeedSource,
    };

    fn schema() -> Schema {
        let repositories = Repositories {
            questions: Arc::new(MockQuestionRepository::new()),
            topics: Arc::new(MockTopicRepository::new()),
            users: Arc::new(MockUserRepository::new()),
            history: Arc::new(MockHistoryRepository::new()),
            bookmarks: Arc::new(MockBookmarkRepository::new()),
            chats: Arc::new(MockChatRepository::new()),
        };
        let state = AppState::from_parts(
            Config::test_config(),
            repositories,
            Arc::new(StaticSeedSource::new()),
        );
        create_schema(state)
    }

    #[test]
    fn schema_exposes_quiz_operations() {
        let sdl = schema().sdl();

        let fields = ["questions", "topicCounts", "leaderboard", "importQuestions", "toggleBookmark"];
        for field in fields {
            assert!(sdl.contains(field), "missing {}", field);
        }
    }

    #[tokio::test]
    async fn anonymous_admin_query_is_rejected() {
        let response = schema().execute("{ users { uid } }").await;

        assert!(!response.errors.is_empty());
    }
}
