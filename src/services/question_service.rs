use std::sync::Arc;

use futures::future::join_all;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::Question,
        dto::{
            request::{
                validate_question_fields, CreateQuestionRequest, ImportQuestionItem,
                UpdateQuestionRequest,
            },
            response::{ImportSummary, QuestionList},
        },
    },
    repositories::QuestionRepository,
    services::question_bank::QuestionBank,
};

pub const DEFAULT_TOPIC: &str = "React";

pub struct QuestionService {
    store: Arc<dyn QuestionRepository>,
    bank: Arc<QuestionBank>,
}

impl QuestionService {
    pub fn new(store: Arc<dyn QuestionRepository>, bank: Arc<QuestionBank>) -> Self {
        Self { store, bank }
    }

    /// Reconciled list for `topic`. The seed backfill keeps running in the
    /// background after this returns.
    pub async fn questions_for_topic(&self, topic: &str) -> AppResult<QuestionList> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AppError::ValidationError("Topic is required".into()));
        }

        let reconciliation = self.bank.reconcile(topic).await;
        Ok(QuestionList {
            topic: reconciliation.topic,
            questions: reconciliation.questions,
            warnings: reconciliation.warnings,
        })
    }

    pub async fn get_question(&self, id: &str) -> AppResult<Question> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))
    }

    pub async fn add_question(&self, request: CreateQuestionRequest) -> AppResult<Question> {
        request.validate()?;

        let topic = request
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TOPIC);

        let question = Question::new(topic, &request.question, request.options, &request.answer);
        let question = self.store.insert(question).await?;
        log::info!("Added question '{}' to '{}'", question.id, question.topic);
        Ok(question)
    }

    pub async fn update_question(
        &self,
        id: &str,
        request: UpdateQuestionRequest,
    ) -> AppResult<Question> {
        request.validate()?;

        let mut question = self.get_question(id).await?;
        if let Some(text) = request.question {
            question.question = text;
        }
        if let Some(options) = request.options {
            question.options = options;
        }
        if let Some(answer) = request.answer {
            question.answer = answer;
        }
        if let Some(topic) = request.topic {
            question.topic = topic.trim().to_string();
        }

        validate_question_fields(&question.question, &question.options, &question.answer)?;
        self.store.update(question).await
    }

    pub async fn delete_question(&self, id: &str) -> AppResult<()> {
        self.store.delete(id).await?;
        log::info!("Deleted question '{}'", id);
        Ok(())
    }

    /// Bulk insert from an uploaded file. Records without text, options or an
    /// answer are counted as skipped.
    pub async fn import_questions(
        &self,
        topic: &str,
        items: Vec<ImportQuestionItem>,
    ) -> AppResult<ImportSummary> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AppError::ValidationError(
                "Select a topic before importing".into(),
            ));
        }

        let total = items.len() as i64;
        let complete: Vec<Question> = items
            .into_iter()
            .filter_map(|item| complete_item(topic, item))
            .collect();
        let mut skipped = total - complete.len() as i64;

        let results = join_all(complete.into_iter().map(|q| self.store.insert(q))).await;
        let mut imported = 0;
        for result in results {
            match result {
                Ok(_) => imported += 1,
                Err(err) => {
                    log::error!("Import into '{}' failed for one question: {}", topic, err);
                    skipped += 1;
                }
            }
        }

        log::info!("Imported {} question(s) into '{}', skipped {}", imported, topic, skipped);
        Ok(ImportSummary { imported, skipped })
    }
}

fn complete_item(topic: &str, item: ImportQuestionItem) -> Option<Question> {
    let question = item.question.filter(|q| !q.trim().is_empty())?;
    let options = item.options.filter(|o| !o.is_empty())?;
    let answer = item.answer.filter(|a| !a.trim().is_empty())?;
    Some(Question::new(topic, &question, options, &answer))
}
