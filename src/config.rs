use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine::levels::{GameLevel, LevelTable};
use crate::store::json_store::default_data_dir;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Quote pool to rotate through. Unset means the built-in quotes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    #[serde(default = "default_death_mode")]
    pub death_mode: bool,
    #[serde(default = "default_repeat_mode")]
    pub repeat_mode: bool,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_repeat_delay_ms")]
    pub repeat_delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<GameLevel>>,
}

fn default_user_id() -> String {
    "local".to_string()
}
fn default_death_mode() -> bool {
    false
}
fn default_repeat_mode() -> bool {
    false
}
fn default_tick_ms() -> u64 {
    200
}
fn default_repeat_delay_ms() -> u64 {
    1500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            script_id: None,
            death_mode: default_death_mode(),
            repeat_mode: default_repeat_mode(),
            tick_ms: default_tick_ms(),
            repeat_delay_ms: default_repeat_delay_ms(),
            data_dir: None,
            levels: None,
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Like `load_from`, but an unreadable or malformed file is logged and
    /// replaced by the defaults.
    pub fn load_or_default_from(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring config at {}: {e}", path.display());
                Config::default()
            }
        }
    }

    pub fn load_or_default() -> Self {
        Self::load_or_default_from(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Persist the death/repeat toggles into the file at `path`, leaving
    /// the rest of the stored config (not any CLI overrides) as it was.
    pub fn save_modes_to(path: &Path, death_mode: bool, repeat_mode: bool) -> Result<()> {
        let mut stored = Self::load_from(path)?;
        stored.death_mode = death_mode;
        stored.repeat_mode = repeat_mode;
        stored.save_to(path)
    }

    pub fn save_modes(&self) -> Result<()> {
        Self::save_modes_to(&Self::config_path(), self.death_mode, self.repeat_mode)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyladder")
            .join("config.toml")
    }

    /// Clamp values that would make the app unusable and drop a level
    /// table that has no level 1.
    pub fn validate(&mut self) {
        self.tick_ms = self.tick_ms.clamp(50, 1000);
        self.repeat_delay_ms = self.repeat_delay_ms.min(10_000);
        if self.user_id.trim().is_empty() {
            self.user_id = default_user_id();
        }
        if self.script_id.as_deref().is_some_and(|s| s.trim().is_empty()) {
            self.script_id = None;
        }
        if let Some(levels) = &self.levels
            && !levels.iter().any(|l| l.level == 1)
        {
            warn!("configured levels have no level 1; ignoring them");
            self.levels = None;
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn repeat_delay(&self) -> Duration {
        Duration::from_millis(self.repeat_delay_ms)
    }

    pub fn level_table(&self) -> LevelTable {
        match &self.levels {
            Some(levels) => LevelTable::from_levels(levels.clone()),
            None => LevelTable::default(),
        }
    }
}
