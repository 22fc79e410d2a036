use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::levels::{GameLevel, LevelTable};
use crate::session::result::SessionCompleted;
use crate::store::ProgressStore;

// --- Persisted Progress ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    /// Best wpm of any successful attempt; unset until the first success.
    pub baseline_wpm: Option<f64>,
    pub current_level: u32,
    pub level_attempts_used: u32,
    pub successful_quotes_count: u32,
    pub level_best_wpm: f64,
    #[serde(default)]
    pub completed_quotes: BTreeSet<String>,
    #[serde(default)]
    pub current_quote_index: u32,
}

impl UserProgress {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            baseline_wpm: None,
            current_level: 1,
            level_attempts_used: 0,
            successful_quotes_count: 0,
            level_best_wpm: 0.0,
            completed_quotes: BTreeSet::new(),
            current_quote_index: 0,
        }
    }
}

// --- Events ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelCompleted {
    pub completed_level: u32,
    pub best_wpm: f64,
    pub next_level: u32,
    pub next_level_wpm_target: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProgressUpdate {
    pub successful: bool,
    /// `None` while the user has no baseline, in which case speed was not
    /// checked.
    pub wpm_threshold: Option<f64>,
    pub progress: UserProgress,
    pub level_completed: Option<LevelCompleted>,
}

// --- Progression Engine ---

/// Owns every user's `UserProgress`. Sessions report finished attempts
/// here and never touch progress directly.
pub struct ProgressionEngine {
    store: Rc<dyn ProgressStore>,
    levels: LevelTable,
    users: HashMap<String, UserProgress>,
    just_completed: Option<LevelCompleted>,
}

impl ProgressionEngine {
    pub fn new(store: Rc<dyn ProgressStore>, levels: LevelTable) -> Self {
        Self {
            store,
            levels,
            users: HashMap::new(),
            just_completed: None,
        }
    }

    pub fn get_level_parameters(&self, level: u32) -> GameLevel {
        self.levels.get_level_parameters(level)
    }

    /// Progress for `user_id`, loaded from the store on first access. A
    /// store failure yields a fresh record rather than an error.
    pub fn progress(&mut self, user_id: &str) -> &UserProgress {
        let store = &self.store;
        self.users
            .entry(user_id.to_string())
            .or_insert_with(|| load_progress(store.as_ref(), user_id))
    }

    pub fn attempts_remaining(&mut self, user_id: &str) -> u32 {
        let progress = self.progress(user_id).clone();
        self.get_level_parameters(progress.current_level)
            .max_attempts
            .saturating_sub(progress.level_attempts_used)
    }

    /// The wpm an attempt has to reach at the user's current level.
    pub fn current_wpm_threshold(&mut self, user_id: &str) -> Option<f64> {
        let progress = self.progress(user_id).clone();
        let params = self.get_level_parameters(progress.current_level);
        progress.baseline_wpm.map(|b| params.wpm_threshold(b))
    }

    pub fn consume(&mut self, user_id: &str, completed: &SessionCompleted) -> ProgressUpdate {
        self.record_attempt(
            user_id,
            &completed.quote_id,
            completed.stats.wpm,
            completed.stats.accuracy,
        )
    }

    pub fn record_attempt(
        &mut self,
        user_id: &str,
        quote_id: &str,
        wpm: f64,
        accuracy: f64,
    ) -> ProgressUpdate {
        let mut progress = self.progress(user_id).clone();
        let params = self.get_level_parameters(progress.current_level);

        let wpm_threshold = progress.baseline_wpm.map(|b| params.wpm_threshold(b));
        let successful = wpm_threshold.is_none_or(|t| wpm >= t)
            && accuracy >= params.accuracy_threshold;

        progress.level_attempts_used += 1;
        progress.current_quote_index += 1;

        if successful {
            progress.successful_quotes_count += 1;
            progress.completed_quotes.insert(quote_id.to_string());
            if wpm > progress.level_best_wpm {
                progress.level_best_wpm = wpm;
            }
            if progress.baseline_wpm.is_none_or(|b| b < wpm) {
                progress.baseline_wpm = Some(wpm);
            }
        }

        let level_completed = if progress.successful_quotes_count >= params.required_quotes {
            Some(self.complete_level(&mut progress))
        } else {
            None
        };

        if let Err(e) = self.store.save_progress(&progress) {
            warn!("failed to save progress for {user_id}: {e}");
        }
        self.users.insert(user_id.to_string(), progress.clone());
        if level_completed.is_some() {
            self.just_completed = level_completed.clone();
        }

        ProgressUpdate {
            successful,
            wpm_threshold,
            progress,
            level_completed,
        }
    }

    /// Returns the most recent level completion once, then clears it.
    pub fn level_just_completed(&mut self) -> Option<LevelCompleted> {
        self.just_completed.take()
    }

    /// Throw away all progress for the user and start again at level 1.
    pub fn reset_progress(&mut self, user_id: &str) -> &UserProgress {
        if let Err(e) = self.store.delete_progress(user_id) {
            warn!("failed to delete stored progress for {user_id}: {e}");
        }
        info!("progress reset for {user_id}");
        self.just_completed = None;
        self.users.insert(user_id.to_string(), UserProgress::new(user_id));
        self.progress(user_id)
    }

    fn complete_level(&self, progress: &mut UserProgress) -> LevelCompleted {
        let completed_level = progress.current_level;
        let next_level = completed_level + 1;
        let best_wpm = progress.level_best_wpm;
        let next_params = self.get_level_parameters(next_level);
        let next_level_wpm_target = progress
            .baseline_wpm
            .map(|b| next_params.wpm_threshold(b).round())
            .unwrap_or(0.0);

        info!(
            "{} completed level {completed_level} (best {best_wpm} wpm); level {next_level} target {next_level_wpm_target} wpm",
            progress.user_id
        );

        progress.current_level = next_level;
        progress.level_attempts_used = 0;
        progress.successful_quotes_count = 0;
        progress.level_best_wpm = 0.0;
        progress.completed_quotes.clear();

        LevelCompleted {
            completed_level,
            best_wpm,
            next_level,
            next_level_wpm_target,
        }
    }
}

fn load_progress(store: &dyn ProgressStore, user_id: &str) -> UserProgress {
    match store.get_progress(user_id) {
        Ok(Some(progress)) => progress,
        Ok(None) => UserProgress::new(user_id),
        Err(e) => {
            warn!("failed to load progress for {user_id}: {e}; starting fresh");
            UserProgress::new(user_id)
        }
    }
}
