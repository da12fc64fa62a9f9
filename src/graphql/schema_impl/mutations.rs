use async_graphql::{Context, Object};

use crate::{
    app_state::AppState,
    auth::{extract_claims_from_context, require_admin},
    errors::{AppError, AppResult},
    models::{
        domain::{ChatMessage, Question, Topic, UserProfile},
        dto::{
            request::{
                AdminCreateUserRequest, AdminUpdateUserRequest, CreateQuestionRequest,
                ImportQuestionItem, SendFileMessageRequest, UpdateProfileRequest,
                UpdateQuestionRequest,
            },
            response::{BookmarkToggle, DeleteResponse, ImportSummary},
        },
    },
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn add_topic(&self, ctx: &Context<'_>, name: String) -> AppResult<Topic> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        require_admin(&claims)?;

        state.topic_service.add_topic(&name).await
    }

    async fn delete_topic(&self, ctx: &Context<'_>, name: String) -> AppResult<DeleteResponse> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        require_admin(&claims)?;

        let deleted = state.topic_service.delete_topic(&name).await?;
        Ok(DeleteResponse::new(format!(
            "Deleted {} topic entr{} named '{}'",
            deleted,
            if deleted == 1 { "y" } else { "ies" },
            name
        )))
    }

    async fn add_question(
        &self,
        ctx: &Context<'_>,
        input: CreateQuestionRequest,
    ) -> AppResult<Question> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        require_admin(&claims)?;

        state.question_service.add_question(input).await
    }

    async fn update_question(
        &self,
        ctx: &Context<'_>,
        id: String,
        input: UpdateQuestionRequest,
    ) -> AppResult<Question> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        require_admin(&claims)?;

        state.question_service.update_question(&id, input).await
    }

    async fn delete_question(&self, ctx: &Context<'_>, id: String) -> AppResult<DeleteResponse> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        require_admin(&claims)?;

        state.question_service.delete_question(&id).await?;
        Ok(DeleteResponse::new(format!("Question '{}' deleted", id)))
    }

    async fn import_questions(
        &self,
        ctx: &Context<'_>,
        topic: String,
        items: Vec<ImportQuestionItem>,
    ) -> AppResult<ImportSummary> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        require_admin(&claims)?;

        state.question_service.import_questions(&topic, items).await
    }

    async fn update_profile(
        &self,
        ctx: &Context<'_>,
        input: UpdateProfileRequest,
    ) -> AppResult<UserProfile> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.user_service.update_profile(&claims.sub, input).await
    }

    async fn admin_add_user(
        &self,
        ctx: &Context<'_>,
        input: AdminCreateUserRequest,
    ) -> AppResult<UserProfile> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        require_admin(&claims)?;

        state.user_service.admin_add_user(input).await
    }

    async fn admin_update_user(
        &self,
        ctx: &Context<'_>,
        uid: String,
        input: AdminUpdateUserRequest,
    ) -> AppResult<UserProfile> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        require_admin(&claims)?;

        state.user_service.admin_update_user(&uid, input).await
    }

    async fn delete_user(&self, ctx: &Context<'_>, uid: String) -> AppResult<DeleteResponse> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        require_admin(&claims)?;

        state.user_service.delete_user(&uid).await?;
        Ok(DeleteResponse::new(format!("User '{}' deleted", uid)))
    }

    async fn delete_history_item(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> AppResult<DeleteResponse> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.user_service.delete_history_item(&claims.sub, &id).await?;
        Ok(DeleteResponse::new("History entry deleted"))
    }

    /// Works for stored and built-in questions alike; the question is looked
    /// up in the reconciled list of its topic.
    async fn toggle_bookmark(
        &self,
        ctx: &Context<'_>,
        topic: String,
        question_id: String,
    ) -> AppResult<BookmarkToggle> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        let list = state.question_service.questions_for_topic(&topic).await?;
        let question = list
            .questions
            .into_iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Question '{}' not found in '{}'",
                    question_id, topic
                ))
            })?;

        state
            .bookmark_service
            .toggle_bookmark(&claims.sub, question)
            .await
    }

    async fn send_message(
        &self,
        ctx: &Context<'_>,
        receiver_id: String,
        text: String,
    ) -> AppResult<ChatMessage> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state
            .chat_service
            .send_message(&claims.sub, &receiver_id, &text)
            .await
    }

    async fn send_file_message(
        &self,
        ctx: &Context<'_>,
        input: SendFileMessageRequest,
    ) -> AppResult<ChatMessage> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.chat_service.send_file_message(&claims.sub, input).await
    }

    async fn update_message(
        &self,
        ctx: &Context<'_>,
        chat_id: String,
        message_id: String,
        text: String,
    ) -> AppResult<bool> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state
            .chat_service
            .update_message(&claims.sub, &chat_id, &message_id, &text)
            .await?;
        Ok(true)
    }

    async fn delete_message(
        &self,
        ctx: &Context<'_>,
        chat_id: String,
        message_id: String,
    ) -> AppResult<DeleteResponse> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state
            .chat_service
            .delete_message(&claims.sub, &chat_id, &message_id)
            .await?;
        Ok(DeleteResponse::new("Message deleted"))
    }

    async fn mark_read(&self, ctx: &Context<'_>, chat_id: String) -> AppResult<bool> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.chat_service.mark_read(&claims.sub, &chat_id).await?;
        Ok(true)
    }
}
