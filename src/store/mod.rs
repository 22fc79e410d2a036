pub mod json_store;
pub mod memory;
pub mod schema;

use thiserror::Error;

use crate::engine::progression::UserProgress;
use crate::quotes::Quote;
use crate::session::result::SessionRecord;
use crate::store::schema::UserStats;

/// Errors surfaced by store adapters. The engine never treats these as
/// fatal; callers log and carry on with a fallback.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported schema version {found} (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait QuoteSource {
    /// Quotes for a script, or every known quote when `scope` is `None`.
    fn list_quotes(&self, scope: Option<&str>) -> Result<Vec<Quote>, StoreError>;
}

pub trait HistoryStore {
    fn record_session(&self, record: &SessionRecord) -> Result<(), StoreError>;

    fn user_stats(&self, user_id: &str) -> Result<UserStats, StoreError>;
}

pub trait ProgressStore {
    /// `Ok(None)` when the user has no stored progress yet.
    fn get_progress(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError>;

    fn save_progress(&self, progress: &UserProgress) -> Result<(), StoreError>;

    fn delete_progress(&self, user_id: &str) -> Result<(), StoreError>;
}
