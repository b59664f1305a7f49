pub mod admin;
pub mod batch;
pub mod engine;
pub mod error;
pub mod sources;
pub mod traits;

pub use batch::{BatchReport, resolve_unresolved};
pub use engine::{PickResolver, Resolution};
pub use error::{ResolveError, Result, SourceError};
pub use traits::{KnowledgeSource, SubjectFacts};

pub use sources::wikipedia::{WikipediaConfig, WikipediaSource};
