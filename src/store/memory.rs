use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use crate::engine::progression::UserProgress;
use crate::quotes::Quote;
use crate::session::result::SessionRecord;
use crate::store::schema::UserStats;
use crate::store::{HistoryStore, ProgressStore, QuoteSource, StoreError};

/// In-memory store for tests and `--ephemeral` runs.
#[derive(Default)]
pub struct MemoryStore {
    scripts: RefCell<BTreeMap<String, Vec<Quote>>>,
    sessions: RefCell<Vec<SessionRecord>>,
    progress: RefCell<HashMap<String, UserProgress>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, script_id: &str, quotes: Vec<Quote>) -> Self {
        self.scripts.borrow_mut().insert(script_id.to_string(), quotes);
        self
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.sessions.borrow().clone()
    }
}

impl QuoteSource for MemoryStore {
    fn list_quotes(&self, scope: Option<&str>) -> Result<Vec<Quote>, StoreError> {
        let scripts = self.scripts.borrow();
        Ok(match scope {
            Some(id) => scripts.get(id).cloned().unwrap_or_default(),
            None => scripts.values().flatten().cloned().collect(),
        })
    }
}

impl HistoryStore for MemoryStore {
    fn record_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.sessions.borrow_mut().push(record.clone());
        Ok(())
    }

    fn user_stats(&self, user_id: &str) -> Result<UserStats, StoreError> {
        let sessions = self.sessions.borrow();
        Ok(UserStats::from_records(
            sessions.iter().filter(|r| r.user_id == user_id),
        ))
    }
}

impl ProgressStore for MemoryStore {
    fn get_progress(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError> {
        Ok(self.progress.borrow().get(user_id).cloned())
    }

    fn save_progress(&self, progress: &UserProgress) -> Result<(), StoreError> {
        self.progress
            .borrow_mut()
            .insert(progress.user_id.clone(), progress.clone());
        Ok(())
    }

    fn delete_progress(&self, user_id: &str) -> Result<(), StoreError> {
        self.progress.borrow_mut().remove(user_id);
        Ok(())
    }
}
