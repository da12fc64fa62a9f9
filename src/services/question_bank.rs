use std::{collections::HashSet, sync::Arc};

use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::{
    models::{
        domain::{Question, SeedQuestion},
        dto::response::Warning,
    },
    repositories::QuestionRepository,
    services::seed_source::SeedSource,
};

/// Merged question list for one topic.
pub struct Reconciliation {
    pub topic: String,
    pub questions: Vec<Question>,
    pub warnings: Vec<Warning>,
    /// Handle of the background seed backfill.
    pub backfill: Option<JoinHandle<BackfillReport>>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub inserted: usize,
    pub failed: usize,
}

/// Merges stored questions with the static seed list of a topic.
pub struct QuestionBank {
    store: Arc<dyn QuestionRepository>,
    seeds: Arc<dyn SeedSource>,
}

impl QuestionBank {
    pub fn new(store: Arc<dyn QuestionRepository>, seeds: Arc<dyn SeedSource>) -> Self {
        Self { store, seeds }
    }

    pub fn seeds(&self) -> &Arc<dyn SeedSource> {
        &self.seeds
    }

    /// Stored questions first, in store order, then seed questions whose
    /// normalized text is not already present, in seed order.
    pub async fn reconcile(&self, topic: &str) -> Reconciliation {
        let (stored, seeded) = tokio::join!(
            self.store.find_by_topic(topic),
            self.seeds.load_seed(topic)
        );

        let mut warnings = Vec::new();
        let (stored, store_available) = match stored {
            Ok(questions) => (questions, true),
            Err(err) => {
                log::warn!("Question store unavailable for '{}', using seed only: {}", topic, err);
                warnings.push(Warning::StoreUnavailable);
                (Vec::new(), false)
            }
        };

        let mut seen = HashSet::new();
        let mut questions = Vec::with_capacity(stored.len());
        for question in stored {
            if seen.insert(question.normalized_text()) {
                questions.push(question);
            } else {
                log::debug!("Skipping duplicate stored question '{}'", question.id);
            }
        }

        let mut unseen = Vec::new();
        for seed in seeded.unwrap_or_default() {
            let normalized = seed.normalized_text();
            if normalized.is_empty() || !seen.insert(normalized) {
                continue;
            }
            questions.push(seed.to_display_question(topic));
            unseen.push(seed);
        }

        if questions.is_empty() {
            log::info!("Topic '{}' has no questions yet", topic);
            warnings.push(Warning::EmptyTopic);
        }

        let backfill = (store_available && !unseen.is_empty())
            .then(|| self.spawn_backfill(topic, unseen));

        Reconciliation {
            topic: topic.to_string(),
            questions,
            warnings,
            backfill,
        }
    }

    fn spawn_backfill(&self, topic: &str, seeds: Vec<SeedQuestion>) -> JoinHandle<BackfillReport> {
        let store = Arc::clone(&self.store);
        let topic = topic.to_string();

        tokio::spawn(async move {
            let inserts = seeds
                .iter()
                .map(|seed| store.insert(seed.to_stored_question(&topic)));
            let results = join_all(inserts).await;

            let mut report = BackfillReport::default();
            for result in results {
                match result {
                    Ok(_) => report.inserted += 1,
                    Err(err) => {
                        report.failed += 1;
                        log::error!("Backfill of seed question for '{}' failed: {}", topic, err);
                    }
                }
            }
            log::info!(
                "Backfilled {} seed question(s) for '{}' ({} failed)",
                report.inserted,
                topic,
                report.failed
            );
            report
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::AppError, repositories::question_repository::MockQuestionRepository,
        services::seed_source::StaticSeedSource,
    };

    fn stored(id: &str, text: &str) -> Question {
        Question {
            id: id.to_string(),
            question: text.to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            answer: "a".into(),
            topic: "X".into(),
            created_at: None,
        }
    }

    fn seed(text: &str) -> SeedQuestion {
        SeedQuestion {
            question: text.to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            answer: "a".into(),
        }
    }

    #[tokio::test]
    async fn merges_store_first_and_drops_normalized_duplicates() {
        let mut store = MockQuestionRepository::new();
        store
            .expect_find_by_topic()
            .returning(|_| Ok(vec![stored("db-1", "Foo")]));
        store
            .expect_insert()
            .times(1)
            .withf(|q| q.question == "Bar" && q.topic == "X" && !q.is_seed_only())
            .returning(Ok);
        let seeds = StaticSeedSource::new().with_topic("X", vec![seed("foo "), seed("Bar")]);
        let bank = QuestionBank::new(Arc::new(store), Arc::new(seeds));

        let result = bank.reconcile("X").await;

        let texts: Vec<_> = result.questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, vec!["Foo", "Bar"]);
        assert_eq!(result.questions[0].id, "db-1");
        assert!(result.questions[1].is_seed_only());
        assert!(result.warnings.is_empty());

        let report = result.backfill.expect("backfill should run").await.unwrap();
        assert_eq!(report, BackfillReport { inserted: 1, failed: 0 });
    }

    #[tokio::test]
    async fn store_failure_falls_back_to_seed_without_backfill() {
        let mut store = MockQuestionRepository::new();
        store
            .expect_find_by_topic()
            .returning(|_| Err(AppError::DatabaseError("down".into())));
        store.expect_insert().never();
        let seeds = StaticSeedSource::new().with_topic("X", vec![seed("Bar")]);
        let bank = QuestionBank::new(Arc::new(store), Arc::new(seeds));

        let result = bank.reconcile("X").await;

        assert_eq!(result.questions.len(), 1);
        assert_eq!(result.warnings, vec![Warning::StoreUnavailable]);
        assert!(result.backfill.is_none());
    }

    #[tokio::test]
    async fn missing_seed_is_silent() {
        let mut store = MockQuestionRepository::new();
        store
            .expect_find_by_topic()
            .returning(|_| Ok(vec![stored("db-1", "Foo")]));
        let bank = QuestionBank::new(Arc::new(store), Arc::new(StaticSeedSource::new()));

        let result = bank.reconcile("X").await;

        assert_eq!(result.questions.len(), 1);
        assert!(result.warnings.is_empty());
        assert!(result.backfill.is_none());
    }

    #[tokio::test]
    async fn empty_topic_is_reported() {
        let mut store = MockQuestionRepository::new();
        store.expect_find_by_topic().returning(|_| Ok(vec![]));
        let bank = QuestionBank::new(Arc::new(store), Arc::new(StaticSeedSource::new()));

        let result = bank.reconcile("Nothing").await;

        assert!(result.is_empty());
        assert_eq!(result.warnings, vec![Warning::EmptyTopic]);
    }

    #[tokio::test]
    async fn backfill_failures_are_counted_not_returned() {
        let mut store = MockQuestionRepository::new();
        store.expect_find_by_topic().returning(|_| Ok(vec![]));
        store
            .expect_insert()
            .returning(|_| Err(AppError::DatabaseError("write refused".into())));
        let seeds = StaticSeedSource::new().with_topic("X", vec![seed("A"), seed("B")]);
        let bank = QuestionBank::new(Arc::new(store), Arc::new(seeds));

        let result = bank.reconcile("X").await;

        assert_eq!(result.questions.len(), 2);
        assert!(result.warnings.is_empty());
        let report = result.backfill.unwrap().await.unwrap();
        assert_eq!(report, BackfillReport { inserted: 0, failed: 2 });
    }

    #[tokio::test]
    async fn duplicates_inside_seed_and_store_are_collapsed() {
        let mut store = MockQuestionRepository::new();
        store
            .expect_find_by_topic()
            .returning(|_| Ok(vec![stored("db-1", "Foo"), stored("db-2", " FOO")]));
        store.expect_insert().times(1).returning(Ok);
        let seeds = StaticSeedSource::new()
            .with_topic("X", vec![seed("Bar"), seed("bar"), seed("   ")]);
        let bank = QuestionBank::new(Arc::new(store), Arc::new(seeds));

        let result = bank.reconcile("X").await;

        let ids: Vec<_> = result.questions.iter().map(|q| q.id.clone()).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], "db-1");
        result.backfill.unwrap().await.unwrap();
    }
}
