use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::quotes::Quote;
use crate::session::result::SessionCompleted;
use crate::session::stats::{CharCounts, TypingStats};
use crate::session::timer::SessionTimer;
use crate::session::tokenizer::{self, CharState, Word};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    CharacterTyped(char),
    SpaceTyped,
    Backspace,
    Reset,
    LoadNext(Quote),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
    /// Input dropped: finished session, empty quote or nothing to undo.
    Ignored,
    /// A keystroke was scored; the caret may or may not have moved.
    Typed { correct: bool },
    WordCompleted,
    Finished(SessionCompleted),
    /// Death mode wiped the attempt.
    Died { failures: u32 },
    /// Backspace moved the caret.
    Moved,
    Reset,
    Loaded,
}

/// The state of one typing attempt over one quote.
///
/// The caret is `(word_idx, char_idx)`. `char_idx == word.len()` means the
/// word is fully typed and the next keystroke should be the separating
/// space; in that state the first character of the following word carries
/// the `Current` marker, so exactly one character is `Current` until the
/// session finishes.
pub struct TypingSession {
    quote: Quote,
    words: Vec<Word>,
    word_idx: usize,
    char_idx: usize,
    is_active: bool,
    is_finished: bool,
    death_mode: bool,
    repeat_mode: bool,
    failure_count: u32,
    counts: CharCounts,
    stats: TypingStats,
    timer: SessionTimer,
}

impl TypingSession {
    pub fn new(quote: Quote) -> Self {
        let words = tokenizer::tokenize(&quote.content);
        let counts = CharCounts::new(tokenizer::total_chars(&quote.content));
        Self {
            quote,
            words,
            word_idx: 0,
            char_idx: 0,
            is_active: false,
            is_finished: false,
            death_mode: false,
            repeat_mode: false,
            failure_count: 0,
            counts,
            stats: TypingStats::derive(counts, Duration::ZERO),
            timer: SessionTimer::new(),
        }
    }

    pub fn quote(&self) -> &Quote {
        &self.quote
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn stats(&self) -> &TypingStats {
        &self.stats
    }

    pub fn counts(&self) -> CharCounts {
        self.counts
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    pub fn current_word_index(&self) -> usize {
        self.word_idx
    }

    pub fn current_char_index(&self) -> usize {
        self.char_idx
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn death_mode(&self) -> bool {
        self.death_mode
    }

    pub fn repeat_mode(&self) -> bool {
        self.repeat_mode
    }

    pub fn toggle_death_mode(&mut self) -> bool {
        self.death_mode = !self.death_mode;
        self.death_mode
    }

    pub fn toggle_repeat_mode(&mut self) -> bool {
        self.repeat_mode = !self.repeat_mode;
        self.repeat_mode
    }

    pub fn set_death_mode(&mut self, on: bool) {
        self.death_mode = on;
    }

    pub fn set_repeat_mode(&mut self, on: bool) {
        self.repeat_mode = on;
    }

    pub fn handle_input(&mut self, ch: char) -> Transition {
        self.handle_input_at(ch, Instant::now())
    }

    pub fn handle_input_at(&mut self, ch: char, now: Instant) -> Transition {
        let event = if ch == ' ' {
            SessionEvent::SpaceTyped
        } else {
            SessionEvent::CharacterTyped(ch)
        };
        self.dispatch_at(event, now)
    }

    pub fn smart_backspace(&mut self) -> Transition {
        self.dispatch(SessionEvent::Backspace)
    }

    pub fn reset_test(&mut self) -> Transition {
        self.dispatch(SessionEvent::Reset)
    }

    pub fn load_quote(&mut self, quote: Quote) -> Transition {
        self.dispatch(SessionEvent::LoadNext(quote))
    }

    pub fn dispatch(&mut self, event: SessionEvent) -> Transition {
        self.dispatch_at(event, Instant::now())
    }

    pub fn dispatch_at(&mut self, event: SessionEvent, now: Instant) -> Transition {
        match event {
            SessionEvent::CharacterTyped(ch) => self.type_char(ch, now),
            SessionEvent::SpaceTyped => self.type_space(now),
            SessionEvent::Backspace => self.backspace(),
            SessionEvent::Reset => {
                self.restart();
                Transition::Reset
            }
            SessionEvent::LoadNext(quote) => {
                self.quote = quote;
                self.failure_count = 0;
                self.restart();
                Transition::Loaded
            }
        }
    }

    /// Recompute elapsed time and wpm. Returns false when the session is not
    /// running, in which case the stats are left untouched.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        if !self.is_active || self.is_finished || !self.timer.is_running() {
            return false;
        }
        self.stats = TypingStats::derive(self.counts, self.timer.elapsed(now));
        true
    }

    fn type_char(&mut self, ch: char, now: Instant) -> Transition {
        if !self.accepts_input() {
            return Transition::Ignored;
        }
        self.activate(now);

        let word_len = self.words[self.word_idx].len();
        let is_last_word = self.word_idx + 1 == self.words.len();

        // Word fully typed, a space is expected.
        let Some(expected) = self.words[self.word_idx]
            .characters
            .get(self.char_idx)
            .map(|c| c.ch)
        else {
            if self.death_mode {
                return self.die();
            }
            self.record(false);
            return Transition::Typed { correct: false };
        };

        let correct = expected == ch;
        if !correct && self.death_mode {
            return self.die();
        }

        self.words[self.word_idx].characters[self.char_idx].state = if correct {
            CharState::Correct
        } else {
            CharState::Incorrect
        };
        self.record(correct);

        if self.char_idx + 1 < word_len {
            self.char_idx += 1;
            self.words[self.word_idx].characters[self.char_idx].state = CharState::Current;
        } else if is_last_word {
            return self.finish(now);
        } else {
            self.char_idx = word_len;
            self.words[self.word_idx + 1].characters[0].state = CharState::Current;
        }
        Transition::Typed { correct }
    }

    fn type_space(&mut self, now: Instant) -> Transition {
        if !self.accepts_input() {
            return Transition::Ignored;
        }
        self.activate(now);

        if self.char_idx < self.words[self.word_idx].len() {
            if self.death_mode {
                return self.die();
            }
            self.record(false);
            return Transition::Typed { correct: false };
        }

        if self.word_idx + 1 == self.words.len() {
            return self.finish(now);
        }
        self.word_idx += 1;
        self.char_idx = 0;
        self.words[self.word_idx].characters[0].state = CharState::Current;
        Transition::WordCompleted
    }

    fn backspace(&mut self) -> Transition {
        if !self.accepts_input() {
            return Transition::Ignored;
        }

        if self.char_idx == 0 {
            if self.word_idx == 0 {
                return Transition::Ignored;
            }
            // Crossing back over a space is free: the caret parks at the end
            // of the previous word and the marker stays where it is.
            self.word_idx -= 1;
            self.char_idx = self.words[self.word_idx].len();
            return Transition::Moved;
        }

        let old_caret = self.char_idx;
        let first_error = self.words[self.word_idx].characters[..old_caret]
            .iter()
            .position(|c| c.state == CharState::Incorrect);

        self.set_caret_state(CharState::Inactive);

        match first_error {
            Some(err_idx) => {
                let chars = &mut self.words[self.word_idx].characters;
                // The correct run leading into the error is retyped too.
                let mut start = err_idx;
                while start > 0 && chars[start - 1].state == CharState::Correct {
                    start -= 1;
                }
                for c in &mut chars[start..old_caret] {
                    c.state = CharState::Inactive;
                }
                chars[start].state = CharState::Current;
                self.char_idx = start;
            }
            None => {
                let prev = old_caret - 1;
                let vacated = self.words[self.word_idx].characters[prev].state;
                self.counts = match vacated {
                    CharState::Correct => self.counts.without_correct(),
                    CharState::Incorrect => self.counts.without_incorrect(),
                    _ => self.counts,
                };
                self.stats = self.stats.with_counts(self.counts);
                self.words[self.word_idx].characters[prev].state = CharState::Current;
                self.char_idx = prev;
            }
        }
        Transition::Moved
    }

    fn accepts_input(&self) -> bool {
        if self.is_finished {
            return false;
        }
        if self.words.is_empty() {
            warn!("quote {} has no words; dropping input", self.quote.id);
            return false;
        }
        let in_range = self.word_idx < self.words.len()
            && self.char_idx <= self.words[self.word_idx].len()
            && (self.char_idx < self.words[self.word_idx].len()
                || self.word_idx + 1 < self.words.len());
        if !in_range {
            warn!(
                "caret ({}, {}) out of range for quote {}; dropping input",
                self.word_idx, self.char_idx, self.quote.id
            );
        }
        in_range
    }

    fn activate(&mut self, now: Instant) {
        if !self.is_active {
            self.is_active = true;
            self.timer.start(now);
        }
    }

    fn record(&mut self, correct: bool) {
        self.counts = if correct {
            self.counts.with_correct()
        } else {
            self.counts.with_incorrect()
        };
        self.stats = self.stats.with_counts(self.counts);
    }

    /// The character under the caret, which at a word end is the first
    /// character of the next word.
    fn set_caret_state(&mut self, state: CharState) {
        let (w, c) = if self.char_idx == self.words[self.word_idx].len() {
            (self.word_idx + 1, 0)
        } else {
            (self.word_idx, self.char_idx)
        };
        if let Some(ch) = self.words.get_mut(w).and_then(|word| word.characters.get_mut(c)) {
            ch.state = state;
        }
    }

    fn finish(&mut self, now: Instant) -> Transition {
        self.timer.stop(now);
        self.is_active = false;
        self.is_finished = true;
        self.stats = TypingStats::derive(self.counts, self.timer.elapsed(now));
        debug!(
            "finished quote {}: {} wpm, {}% accuracy",
            self.quote.id, self.stats.wpm, self.stats.accuracy
        );
        Transition::Finished(SessionCompleted {
            quote_id: self.quote.id.clone(),
            stats: self.stats,
            failures: self.failure_count,
        })
    }

    fn die(&mut self) -> Transition {
        self.failure_count += 1;
        debug!(
            "death mode reset on quote {} (failure {})",
            self.quote.id, self.failure_count
        );
        self.restart();
        Transition::Died {
            failures: self.failure_count,
        }
    }

    fn restart(&mut self) {
        self.words = tokenizer::tokenize(&self.quote.content);
        self.word_idx = 0;
        self.char_idx = 0;
        self.is_active = false;
        self.is_finished = false;
        self.counts = CharCounts::new(tokenizer::total_chars(&self.quote.content));
        self.stats = TypingStats::derive(self.counts, Duration::ZERO);
        self.timer.reset();
    }
}
