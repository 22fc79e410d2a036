use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::engine::progression::UserProgress;
use crate::quotes::{Quote, parse_quote_lines};
use crate::session::result::SessionRecord;
use crate::store::schema::{HistoryData, ProgressData, SCHEMA_VERSION, ScriptsData, UserStats};
use crate::store::{HistoryStore, ProgressStore, QuoteSource, StoreError};

const QUOTES_FILE: &str = "quotes.json";
const HISTORY_FILE: &str = "history.json";
const PROGRESS_FILE: &str = "progress.json";

/// Every file carries a `schema_version` so newer data is refused rather
/// than silently misread.
trait Versioned {
    fn schema_version(&self) -> u32;
}

impl Versioned for ScriptsData {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

impl Versioned for HistoryData {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

impl Versioned for ProgressData {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// A missing file is an empty store, not an error.
    fn load<T: DeserializeOwned + Default + Versioned>(&self, name: &str) -> Result<T, StoreError> {
        let path = self.file_path(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(&path)?;
        let data: T = serde_json::from_str(&content)?;
        if data.schema_version() > SCHEMA_VERSION {
            return Err(StoreError::SchemaVersion {
                found: data.schema_version(),
                expected: SCHEMA_VERSION,
            });
        }
        Ok(data)
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<(), StoreError> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Replace the quote pool for `script_id`.
    pub fn save_script(&self, script_id: &str, quotes: Vec<Quote>) -> Result<(), StoreError> {
        let mut data: ScriptsData = self.load(QUOTES_FILE)?;
        data.scripts.insert(script_id.to_string(), quotes);
        self.save(QUOTES_FILE, &data)
    }

    /// Replace `script_id` with the quotes in a text file, one per line.
    /// Returns how many were imported.
    pub fn import_script(&self, script_id: &str, path: &Path) -> Result<usize, StoreError> {
        let text = fs::read_to_string(path)?;
        let quotes = parse_quote_lines(script_id, &text);
        let count = quotes.len();
        self.save_script(script_id, quotes)?;
        Ok(count)
    }

    pub fn script_ids(&self) -> Result<Vec<String>, StoreError> {
        let data: ScriptsData = self.load(QUOTES_FILE)?;
        Ok(data.scripts.into_keys().collect())
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keyladder")
}

impl QuoteSource for JsonStore {
    fn list_quotes(&self, scope: Option<&str>) -> Result<Vec<Quote>, StoreError> {
        let mut data: ScriptsData = self.load(QUOTES_FILE)?;
        Ok(match scope {
            Some(id) => data.scripts.remove(id).unwrap_or_default(),
            None => data.scripts.into_values().flatten().collect(),
        })
    }
}

impl HistoryStore for JsonStore {
    fn record_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut data: HistoryData = self.load(HISTORY_FILE)?;
        data.sessions.push(record.clone());
        self.save(HISTORY_FILE, &data)
    }

    fn user_stats(&self, user_id: &str) -> Result<UserStats, StoreError> {
        let data: HistoryData = self.load(HISTORY_FILE)?;
        Ok(UserStats::from_records(
            data.sessions.iter().filter(|r| r.user_id == user_id),
        ))
    }
}

impl ProgressStore for JsonStore {
    fn get_progress(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError> {
        let mut data: ProgressData = self.load(PROGRESS_FILE)?;
        Ok(data.users.remove(user_id))
    }

    fn save_progress(&self, progress: &UserProgress) -> Result<(), StoreError> {
        let mut data: ProgressData = self.load(PROGRESS_FILE)?;
        data.users.insert(progress.user_id.clone(), progress.clone());
        self.save(PROGRESS_FILE, &data)
    }

    fn delete_progress(&self, user_id: &str) -> Result<(), StoreError> {
        let mut data: ProgressData = self.load(PROGRESS_FILE)?;
        if data.users.remove(user_id).is_some() {
            self.save(PROGRESS_FILE, &data)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn record(user: &str, wpm: f64) -> SessionRecord {
        SessionRecord {
            user_id: user.to_string(),
            script_id: "poems".to_string(),
            quote_id: "q1".to_string(),
            wpm,
            accuracy: 97.0,
            elapsed_secs: 12.5,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_empty_store_reads_as_empty() {
        let (_dir, store) = make_test_store();
        assert!(store.list_quotes(Some("poems")).unwrap().is_empty());
        assert!(store.list_quotes(None).unwrap().is_empty());
        assert!(store.get_progress("alice").unwrap().is_none());
        assert_eq!(store.user_stats("alice").unwrap().sessions, 0);
    }

    #[test]
    fn test_scripts_persist_by_scope() {
        let (_dir, store) = make_test_store();
        store
            .save_script("poems", vec![Quote::new("p1", "roses are red")])
            .unwrap();
        store
            .save_script("prose", vec![Quote::new("s1", "call me ishmael")])
            .unwrap();

        let poems = store.list_quotes(Some("poems")).unwrap();
        assert_eq!(poems, vec![Quote::new("p1", "roses are red")]);
        assert_eq!(store.list_quotes(None).unwrap().len(), 2);
        assert_eq!(store.script_ids().unwrap(), vec!["poems", "prose"]);
    }

    #[test]
    fn test_import_script_from_text_file() {
        let (dir, store) = make_test_store();
        let source = dir.path().join("poems.txt");
        fs::write(&source, "roses are red\n\nviolets  are blue\n").unwrap();

        assert_eq!(store.import_script("poems", &source).unwrap(), 2);
        let poems = store.list_quotes(Some("poems")).unwrap();
        assert_eq!(
            poems,
            vec![
                Quote::new("poems-1", "roses are red"),
                Quote::new("poems-2", "violets are blue"),
            ]
        );

        fs::write(&source, "sugar is sweet\n").unwrap();
        assert_eq!(store.import_script("poems", &source).unwrap(), 1);
        assert_eq!(store.list_quotes(Some("poems")).unwrap().len(), 1);
    }

    #[test]
    fn test_import_missing_file_is_io_error() {
        let (dir, store) = make_test_store();
        let err = store
            .import_script("poems", &dir.path().join("absent.txt"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(store.script_ids().unwrap().is_empty());
    }

    #[test]
    fn test_history_appends_and_aggregates() {
        let (_dir, store) = make_test_store();
        store.record_session(&record("alice", 40.0)).unwrap();
        store.record_session(&record("alice", 50.0)).unwrap();
        store.record_session(&record("bob", 90.0)).unwrap();

        let stats = store.user_stats("alice").unwrap();
        assert_eq!(stats.sessions, 2);
        assert_eq!(stats.best_wpm, 50.0);
        assert_eq!(stats.average_wpm, 45.0);
        assert_eq!(stats.total_secs, 25.0);
    }

    #[test]
    fn test_progress_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
            let mut p = UserProgress::new("alice");
            p.current_level = 4;
            p.baseline_wpm = Some(62.0);
            p.completed_quotes.insert("q7".to_string());
            store.save_progress(&p).unwrap();
        }
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let p = store.get_progress("alice").unwrap().unwrap();
        assert_eq!(p.current_level, 4);
        assert_eq!(p.baseline_wpm, Some(62.0));
        assert!(p.completed_quotes.contains("q7"));
    }

    #[test]
    fn test_delete_progress_only_touches_that_user() {
        let (_dir, store) = make_test_store();
        store.save_progress(&UserProgress::new("alice")).unwrap();
        store.save_progress(&UserProgress::new("bob")).unwrap();
        store.delete_progress("alice").unwrap();
        store.delete_progress("nobody").unwrap();
        assert!(store.get_progress("alice").unwrap().is_none());
        assert!(store.get_progress("bob").unwrap().is_some());
    }

    #[test]
    fn test_save_leaves_no_tmp_files() {
        let (dir, store) = make_test_store();
        store.record_session(&record("alice", 40.0)).unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
        assert!(store.file_path(HISTORY_FILE).exists());
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path(PROGRESS_FILE),
            r#"{"schema_version": 99, "users": {}}"#,
        )
        .unwrap();
        let err = store.get_progress("alice").unwrap_err();
        assert!(matches!(
            err,
            StoreError::SchemaVersion {
                found: 99,
                expected: SCHEMA_VERSION
            }
        ));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(QUOTES_FILE), "not json").unwrap();
        let err = store.list_quotes(Some("poems")).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
