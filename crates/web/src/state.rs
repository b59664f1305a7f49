use std::sync::Arc;

use resolver::{KnowledgeSource, PickResolver};
use storage::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub source: Arc<dyn KnowledgeSource>,
}

impl AppState {
    pub fn new(db: Database, source: Arc<dyn KnowledgeSource>) -> Self {
        Self { db, source }
    }

    pub fn resolver(&self) -> PickResolver<'_> {
        PickResolver::new(self.db.pool(), self.source.as_ref())
    }
}
