use async_graphql::{Context, Object};

use crate::{
    app_state::AppState,
    auth::{extract_claims_from_context, require_admin},
    errors::AppResult,
    models::{
        domain::{Bookmark, ChatMessage, HistoryEntry, TopicCount, UserProfile},
        dto::response::{ConversationDto, LeaderboardEntry, QuestionList},
    },
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn topics(&self, ctx: &Context<'_>) -> AppResult<Vec<String>> {
        let state = ctx.data::<AppState>()?;
        state.topic_service.list_topics().await
    }

    async fn topic_counts(&self, ctx: &Context<'_>) -> AppResult<Vec<TopicCount>> {
        let state = ctx.data::<AppState>()?;
        state.topic_service.topic_counts().await
    }

    async fn questions(&self, ctx: &Context<'_>, topic: String) -> AppResult<QuestionList> {
        let state = ctx.data::<AppState>()?;
        state.question_service.questions_for_topic(&topic).await
    }

    async fn leaderboard(
        &self,
        ctx: &Context<'_>,
        limit: Option<i64>,
    ) -> AppResult<Vec<LeaderboardEntry>> {
        let state = ctx.data::<AppState>()?;
        state.user_service.leaderboard(limit).await
    }

    async fn me(&self, ctx: &Context<'_>) -> AppResult<UserProfile> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.user_service.get_profile(&claims.sub).await
    }

    async fn users(&self, ctx: &Context<'_>) -> AppResult<Vec<UserProfile>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        require_admin(&claims)?;

        state.user_service.list_users().await
    }

    async fn history(&self, ctx: &Context<'_>) -> AppResult<Vec<HistoryEntry>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.user_service.history(&claims.sub).await
    }

    async fn bookmarks(&self, ctx: &Context<'_>) -> AppResult<Vec<Bookmark>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.bookmark_service.list_bookmarks(&claims.sub).await
    }

    async fn conversations(&self, ctx: &Context<'_>) -> AppResult<Vec<ConversationDto>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.chat_service.conversations(&claims.sub).await
    }

    async fn messages(&self, ctx: &Context<'_>, with_user: String) -> AppResult<Vec<ChatMessage>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.chat_service.messages(&claims.sub, &with_user).await
    }
}
