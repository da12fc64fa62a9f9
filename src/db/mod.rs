use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};
use std::time::Duration;

use crate::{config::Config, errors::AppResult};

/// Collection names shared by the repositories.
pub mod collections {
    pub const QUESTIONS: &str = "quizzes";
    pub const TOPICS: &str = "topics";
    pub const USERS: &str = "users";
    pub const HISTORY: &str = "history";
    pub const BOOKMARKS: &str = "bookmarks";
    pub const CHATS: &str = "chats";
    pub const MESSAGES: &str = "messages";

    pub const ALL: &[&str] = &[QUESTIONS, TOPICS, USERS, HISTORY, BOOKMARKS, CHATS, MESSAGES];
}

#[derive(Clone)]
pub struct Database {
    client: Client,
    db_name: String,
}

impl Database {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut client_options = ClientOptions::parse(&config.mongo_conn_string).await?;

        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);
        client_options.max_pool_size = Some(10);
        client_options.min_pool_size = Some(2);
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        log::info!("Connected to MongoDB database '{}'", config.mongo_db_name);

        Ok(Self {
            client,
            db_name: config.mongo_db_name.clone(),
        })
    }

    pub fn get_collection<T>(&self, collection_name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.client
            .database(&self.db_name)
            .collection(collection_name)
    }

    /// Names of the quiz collections that already exist in the database.
    pub async fn existing_collections(&self) -> AppResult<Vec<String>> {
        let names = self
            .client
            .database(&self.db_name)
            .list_collection_names()
            .await?;
        Ok(names
            .into_iter()
            .filter(|name| collections::ALL.contains(&name.as_str()))
            .collect())
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
