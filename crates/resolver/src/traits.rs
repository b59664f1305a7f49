use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Raw biographical facts about a subject. Ages and points are derived later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectFacts {
    pub birth_date: NaiveDate,
    pub death_date: Option<NaiveDate>,
    pub source_url: String,
    pub short_description: String,
}

/// An external service that can tell whether a named subject is alive.
#[async_trait::async_trait]
pub trait KnowledgeSource: Send + Sync {
    async fn resolve_subject(&self, name: &str) -> Result<SubjectFacts, SourceError>;

    fn name(&self) -> &'static str;
}
