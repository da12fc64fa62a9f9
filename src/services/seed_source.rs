use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;

use crate::models::domain::SeedQuestion;

/// Topics shipped with a seed file, and the file that holds each one.
pub const DEFAULT_SEED_FILES: &[(&str, &str)] = &[
    ("React", "quiz.json"),
    ("JavaScript", "javascript.json"),
    ("Python", "python.json"),
    ("Java", "java.json"),
    ("C++", "cpp.json"),
    ("C#", "csharp.json"),
    ("PHP", "php.json"),
    ("Go", "go.json"),
    ("Rust", "rust.json"),
    ("Swift", "swift.json"),
    ("Kotlin", "kotlin.json"),
    ("Ruby", "ruby.json"),
    ("TypeScript", "typescript.json"),
    ("HTML", "html.json"),
    ("CSS", "css.json"),
    ("SQL", "sql.json"),
    ("Angular", "angular.json"),
    ("Vue", "vue.json"),
    ("Node.js", "nodejs.json"),
    ("Flutter", "flutter.json"),
];

pub fn initial_topics() -> Vec<String> {
    DEFAULT_SEED_FILES
        .iter()
        .map(|(topic, _)| topic.to_string())
        .collect()
}

/// Static, read-only question lists keyed by topic name.
#[async_trait]
pub trait SeedSource: Send + Sync {
    /// `None` when the topic has no seed list or it cannot be read.
    async fn load_seed(&self, topic: &str) -> Option<Vec<SeedQuestion>>;
}

/// Seed lists stored as JSON arrays, one file per topic.
pub struct JsonSeedSource {
    dir: PathBuf,
    files: HashMap<String, String>,
}

impl JsonSeedSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let files = DEFAULT_SEED_FILES
            .iter()
            .map(|(topic, file)| (topic.to_string(), file.to_string()))
            .collect();
        Self::with_files(dir, files)
    }

    pub fn with_files(dir: impl AsRef<Path>, files: HashMap<String, String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            files,
        }
    }
}

#[async_trait]
impl SeedSource for JsonSeedSource {
    async fn load_seed(&self, topic: &str) -> Option<Vec<SeedQuestion>> {
        let file = self.files.get(topic)?;
        let path = self.dir.join(file);

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) => {
                log::debug!("No seed file for '{}' at {}: {}", topic, path.display(), err);
                return None;
            }
        };

        match serde_json::from_slice::<Vec<SeedQuestion>>(&raw) {
            Ok(questions) => Some(questions),
            Err(err) => {
                log::warn!("Seed file {} for '{}' is not valid: {}", path.display(), topic, err);
                None
            }
        }
    }
}

/// In-memory seed lists.
#[derive(Default)]
pub struct StaticSeedSource {
    topics: HashMap<String, Vec<SeedQuestion>>,
}

impl StaticSeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topic(mut self, topic: &str, questions: Vec<SeedQuestion>) -> Self {
        self.topics.insert(topic.to_string(), questions);
        self
    }
}

#[async_trait]
impl SeedSource for StaticSeedSource {
    async fn load_seed(&self, topic: &str) -> Option<Vec<SeedQuestion>> {
        self.topics.get(topic).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("quizzes-seed-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn initial_topics_follow_seed_file_table() {
        let topics = initial_topics();

        assert_eq!(topics.len(), DEFAULT_SEED_FILES.len());
        assert_eq!(topics[0], "React");
        assert!(topics.contains(&"Node.js".to_string()));
    }

    #[tokio::test]
    async fn json_seed_source_reads_topic_file() {
        let dir = scratch_dir();
        std::fs::write(
            dir.join("rust.json"),
            r#"[{ "id": 1, "question": "What is Cargo?", "options": ["a","b","c","d"], "answer": "a" }]"#,
        )
        .unwrap();

        let seeds = JsonSeedSource::new(&dir).load_seed("Rust").await.unwrap();

        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].question, "What is Cargo?");
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn json_seed_source_treats_missing_and_broken_files_as_unavailable() {
        let dir = scratch_dir();
        std::fs::write(dir.join("go.json"), "{ not json").unwrap();
        let source = JsonSeedSource::new(&dir);

        assert!(source.load_seed("Go").await.is_none());
        assert!(source.load_seed("Python").await.is_none());
        assert!(source.load_seed("Unknown topic").await.is_none());
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn static_seed_source_returns_registered_topics_only() {
        let source = StaticSeedSource::new().with_topic(
            "X",
            vec![SeedQuestion {
                question: "Foo".into(),
                options: vec![],
                answer: String::new(),
            }],
        );

        assert_eq!(source.load_seed("X").await.unwrap().len(), 1);
        assert!(source.load_seed("Y").await.is_none());
    }
}
