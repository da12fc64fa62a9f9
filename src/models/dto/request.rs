use async_graphql::InputObject;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::errors::{AppError, AppResult};

pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
#[validate(schema(function = "validate_answer_is_option"))]
pub struct CreateQuestionRequest {
    /// Defaults to `React` when omitted.
    pub topic: Option<String>,

    #[validate(length(min = 1, max = 1000))]
    pub question: String,

    #[validate(custom(function = "validate_options"))]
    pub options: Vec<String>,

    #[validate(length(min = 1))]
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, InputObject)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question: Option<String>,

    pub options: Option<Vec<String>>,

    #[validate(length(min = 1))]
    pub answer: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub topic: Option<String>,
}

/// One record of an admin import file. Fields are optional so that a single
/// malformed record does not reject the whole file.
#[derive(Debug, Clone, Default, Deserialize, InputObject)]
pub struct ImportQuestionItem {
    pub question: Option<String>,
    pub options: Option<Vec<String>>,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct StartSessionRequest {
    #[validate(length(min = 1, max = 100))]
    pub topic: String,

    /// Identifies an anonymous session when no bearer token is sent.
    pub client_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1))]
    pub choice: String,

    pub client_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionKeyQuery {
    pub client_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,

    #[validate(url)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct AdminCreateUserRequest {
    #[validate(length(min = 1, max = 128))]
    pub uid: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct AdminUpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,

    #[validate(url)]
    pub photo_url: Option<String>,

    #[validate(range(min = 0))]
    pub total_score: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct SendFileMessageRequest {
    #[validate(length(min = 1))]
    pub receiver_id: String,

    #[validate(url)]
    pub file_url: String,

    #[validate(length(min = 1, max = 255))]
    pub file_type: String,
}

fn validate_options(options: &[String]) -> Result<(), ValidationError> {
    if options.len() != OPTIONS_PER_QUESTION {
        return Err(ValidationError::new("options_count"));
    }
    if options.iter().any(|o| o.trim().is_empty()) {
        return Err(ValidationError::new("empty_option"));
    }
    Ok(())
}

fn validate_answer_is_option(request: &CreateQuestionRequest) -> Result<(), ValidationError> {
    if request.options.contains(&request.answer) {
        Ok(())
    } else {
        Err(ValidationError::new("answer_not_in_options"))
    }
}

/// Authoring-time check for a complete question. Sessions never re-check this.
pub fn validate_question_fields(question: &str, options: &[String], answer: &str) -> AppResult<()> {
    if question.trim().is_empty() {
        return Err(AppError::ValidationError("Question text is required".into()));
    }
    validate_options(options).map_err(|_| {
        AppError::ValidationError(format!(
            "A question needs exactly {} non-empty options",
            OPTIONS_PER_QUESTION
        ))
    })?;
    if !options.iter().any(|o| o == answer) {
        return Err(AppError::ValidationError(
            "The answer must be one of the options".into(),
        ));
    }
    Ok(())
}
