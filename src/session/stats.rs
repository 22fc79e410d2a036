use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Raw keystroke tallies for one attempt. Every transition takes the current
/// counts and returns new ones; nothing else holds them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharCounts {
    pub correct: usize,
    pub incorrect: usize,
    pub total: usize,
}

impl CharCounts {
    pub fn new(total: usize) -> Self {
        Self {
            correct: 0,
            incorrect: 0,
            total,
        }
    }

    pub fn attempted(&self) -> usize {
        self.correct + self.incorrect
    }

    pub fn with_correct(self) -> Self {
        Self {
            correct: self.correct + 1,
            ..self
        }
    }

    pub fn with_incorrect(self) -> Self {
        Self {
            incorrect: self.incorrect + 1,
            ..self
        }
    }

    pub fn without_correct(self) -> Self {
        Self {
            correct: self.correct.saturating_sub(1),
            ..self
        }
    }

    pub fn without_incorrect(self) -> Self {
        Self {
            incorrect: self.incorrect.saturating_sub(1),
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypingStats {
    pub wpm: f64,
    pub accuracy: f64,
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    pub total_chars: usize,
    pub elapsed_secs: f64,
}

impl Default for TypingStats {
    fn default() -> Self {
        Self::derive(CharCounts::default(), Duration::ZERO)
    }
}

impl TypingStats {
    pub fn derive(counts: CharCounts, elapsed: Duration) -> Self {
        Self {
            wpm: wpm(counts.correct, elapsed),
            accuracy: accuracy(counts.correct, counts.incorrect),
            correct_chars: counts.correct,
            incorrect_chars: counts.incorrect,
            total_chars: counts.total,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    /// Refresh counts and accuracy after a keystroke, keeping the wpm and
    /// elapsed time from the last tick.
    pub fn with_counts(self, counts: CharCounts) -> Self {
        Self {
            accuracy: accuracy(counts.correct, counts.incorrect),
            correct_chars: counts.correct,
            incorrect_chars: counts.incorrect,
            total_chars: counts.total,
            ..self
        }
    }
}

/// Words per minute over correct characters, five characters to a word.
pub fn wpm(correct_chars: usize, elapsed: Duration) -> f64 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0.0;
    }
    ((correct_chars as f64 / 5.0) / minutes).round()
}

pub fn accuracy(correct_chars: usize, incorrect_chars: usize) -> f64 {
    let attempted = correct_chars + incorrect_chars;
    if attempted == 0 {
        return 100.0;
    }
    (correct_chars as f64 / attempted as f64 * 100.0).round()
}
