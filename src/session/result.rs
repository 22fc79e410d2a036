use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::stats::TypingStats;

/// Emitted once when a session reaches its finish transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionCompleted {
    pub quote_id: String,
    pub stats: TypingStats,
    pub failures: u32,
}

/// One row of typing history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: String,
    pub script_id: String,
    pub quote_id: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub elapsed_secs: f64,
    pub timestamp: DateTime<Utc>,
}

impl SessionRecord {
    pub fn from_completed(completed: &SessionCompleted, user_id: &str, script_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            script_id: script_id.to_string(),
            quote_id: completed.quote_id.clone(),
            wpm: completed.stats.wpm,
            accuracy: completed.stats.accuracy,
            elapsed_secs: completed.stats.elapsed_secs,
            timestamp: Utc::now(),
        }
    }
}
