use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::progression::UserProgress;
use crate::quotes::Quote;
use crate::session::result::SessionRecord;

pub const SCHEMA_VERSION: u32 = 1;

fn schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Quote pools keyed by script id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScriptsData {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub scripts: BTreeMap<String, Vec<Quote>>,
}

impl Default for ScriptsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            scripts: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryData {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressData {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub users: BTreeMap<String, UserProgress>,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            users: BTreeMap::new(),
        }
    }
}

/// Aggregate over a user's typing history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub sessions: usize,
    pub best_wpm: f64,
    pub average_wpm: f64,
    pub average_accuracy: f64,
    pub total_secs: f64,
}

impl UserStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a SessionRecord>) -> Self {
        let mut stats = UserStats::default();
        let mut wpm_sum = 0.0;
        let mut accuracy_sum = 0.0;
        for r in records {
            stats.sessions += 1;
            stats.best_wpm = stats.best_wpm.max(r.wpm);
            stats.total_secs += r.elapsed_secs;
            wpm_sum += r.wpm;
            accuracy_sum += r.accuracy;
        }
        if stats.sessions > 0 {
            stats.average_wpm = wpm_sum / stats.sessions as f64;
            stats.average_accuracy = accuracy_sum / stats.sessions as f64;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(wpm: f64, accuracy: f64) -> SessionRecord {
        SessionRecord {
            user_id: "u".to_string(),
            script_id: "s".to_string(),
            quote_id: "q".to_string(),
            wpm,
            accuracy,
            elapsed_secs: 20.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_user_stats_empty() {
        let stats = UserStats::from_records(&Vec::<SessionRecord>::new());
        assert_eq!(stats, UserStats::default());
    }

    #[test]
    fn test_user_stats_aggregates() {
        let records = vec![record(40.0, 90.0), record(60.0, 100.0)];
        let stats = UserStats::from_records(&records);
        assert_eq!(stats.sessions, 2);
        assert_eq!(stats.best_wpm, 60.0);
        assert_eq!(stats.average_wpm, 50.0);
        assert_eq!(stats.average_accuracy, 95.0);
        assert_eq!(stats.total_secs, 40.0);
    }

    #[test]
    fn test_old_files_without_version_load() {
        let data: HistoryData = serde_json::from_str(r#"{"sessions": []}"#).unwrap();
        assert_eq!(data.schema_version, SCHEMA_VERSION);
    }
}
