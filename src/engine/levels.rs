use log::warn;
use serde::{Deserialize, Serialize};

/// Pass criteria for one rung of the ladder.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameLevel {
    pub level: u32,
    /// Fraction of the baseline wpm an attempt has to reach.
    pub wpm_threshold_multiplier: f64,
    pub accuracy_threshold: f64,
    pub required_quotes: u32,
    pub max_attempts: u32,
}

impl GameLevel {
    pub fn wpm_threshold(&self, baseline_wpm: f64) -> f64 {
        baseline_wpm * self.wpm_threshold_multiplier
    }
}

const fn level(level: u32, wpm_threshold_multiplier: f64, accuracy_threshold: f64) -> GameLevel {
    GameLevel {
        level,
        wpm_threshold_multiplier,
        accuracy_threshold,
        required_quotes: 5,
        max_attempts: 20,
    }
}

const DEFAULT_LEVELS: &[GameLevel] = &[
    level(1, 0.5, 90.0),
    level(2, 0.6, 91.0),
    level(3, 0.7, 92.0),
    level(4, 0.8, 93.0),
    level(5, 0.9, 94.0),
    level(6, 1.0, 95.0),
    level(7, 1.1, 96.0),
    level(8, 1.2, 97.0),
    level(9, 1.3, 98.0),
    level(10, 1.4, 98.0),
];

#[derive(Clone, Debug, PartialEq)]
pub struct LevelTable {
    levels: Vec<GameLevel>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS.to_vec(),
        }
    }
}

impl LevelTable {
    /// Build a table from configured levels. A table without level 1 has
    /// nothing to fall back on, so the built-in ladder is used instead.
    pub fn from_levels(mut levels: Vec<GameLevel>) -> Self {
        if !levels.iter().any(|l| l.level == 1) {
            warn!("level table has no level 1; using built-in levels");
            return Self::default();
        }
        levels.sort_by_key(|l| l.level);
        levels.dedup_by_key(|l| l.level);
        Self { levels }
    }

    pub fn levels(&self) -> &[GameLevel] {
        &self.levels
    }

    pub fn find(&self, level: u32) -> Option<GameLevel> {
        self.levels.iter().find(|l| l.level == level).copied()
    }

    /// Parameters for `level`, or level 1's when the level is not configured.
    pub fn get_level_parameters(&self, level: u32) -> GameLevel {
        if let Some(found) = self.find(level) {
            return found;
        }
        warn!("no parameters for level {level}; using level 1");
        let base = self.find(1).unwrap_or(DEFAULT_LEVELS[0]);
        GameLevel { level, ..base }
    }
}
