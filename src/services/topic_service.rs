use std::{collections::BTreeSet, sync::Arc};

use futures::future::join_all;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Topic, TopicCount},
    repositories::{QuestionRepository, TopicRepository},
    services::seed_source::{initial_topics, SeedSource},
};

pub struct TopicService {
    topics: Arc<dyn TopicRepository>,
    questions: Arc<dyn QuestionRepository>,
    seeds: Arc<dyn SeedSource>,
}

impl TopicService {
    pub fn new(
        topics: Arc<dyn TopicRepository>,
        questions: Arc<dyn QuestionRepository>,
        seeds: Arc<dyn SeedSource>,
    ) -> Self {
        Self {
            topics,
            questions,
            seeds,
        }
    }

    /// Fills an empty topic collection with the built-in topics. The store
    /// being down is not fatal; the built-in list is returned instead.
    pub async fn initialize(&self) -> Vec<String> {
        match self.topics.find_all().await {
            Ok(stored) if stored.is_empty() => {
                let inserts = initial_topics()
                    .into_iter()
                    .map(|name| self.topics.insert(Topic::new(&name)));
                let failed = join_all(inserts)
                    .await
                    .into_iter()
                    .filter(Result::is_err)
                    .count();
                if failed > 0 {
                    log::warn!("{} initial topic(s) could not be stored", failed);
                } else {
                    log::info!("Stored initial topics");
                }
                sorted_union(Vec::new())
            }
            Ok(stored) => sorted_union(stored),
            Err(err) => {
                log::warn!("Topic store unavailable, using built-in topics: {}", err);
                sorted_union(Vec::new())
            }
        }
    }

    pub async fn list_topics(&self) -> AppResult<Vec<String>> {
        let stored = self.topics.find_all().await?;
        Ok(sorted_union(stored))
    }

    pub async fn add_topic(&self, name: &str) -> AppResult<Topic> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Topic name is required".into()));
        }

        let existing = self.list_topics().await?;
        if existing.iter().any(|t| t.eq_ignore_ascii_case(name)) {
            return Err(AppError::AlreadyExists(format!(
                "Topic '{}' already exists",
                name
            )));
        }

        self.topics.insert(Topic::new(name)).await
    }

    pub async fn delete_topic(&self, name: &str) -> AppResult<u64> {
        let deleted = self.topics.delete_by_name(name).await?;
        if deleted == 0 {
            log::debug!("No stored topic named '{}'", name);
        }
        Ok(deleted)
    }

    /// Number of questions per topic. Topics whose store count is zero report
    /// the size of their built-in list.
    pub async fn topic_counts(&self) -> AppResult<Vec<TopicCount>> {
        let topics = self.list_topics().await?;

        let counts = join_all(topics.iter().map(|topic| self.count_one(topic))).await;
        Ok(topics
            .into_iter()
            .zip(counts)
            .map(|(topic, count)| TopicCount { topic, count })
            .collect())
    }

    async fn count_one(&self, topic: &str) -> i64 {
        let stored = match self.questions.count_by_topic(topic).await {
            Ok(count) => count,
            Err(err) => {
                log::warn!("Could not count questions for '{}': {}", topic, err);
                0
            }
        };
        if stored > 0 {
            return stored;
        }

        self.seeds
            .load_seed(topic)
            .await
            .map(|seed| seed.len() as i64)
            .unwrap_or(0)
    }
}

fn sorted_union(stored: Vec<Topic>) -> Vec<String> {
    initial_topics()
        .into_iter()
        .chain(stored.into_iter().map(|t| t.name))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
