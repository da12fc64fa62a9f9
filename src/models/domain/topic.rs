use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Topic {
    pub id: String,
    pub name: String,
}

impl Topic {
    pub fn new(name: &str) -> Self {
        Topic {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, SimpleObject)]
pub struct TopicCount {
    pub topic: String,
    pub count: i64,
}
