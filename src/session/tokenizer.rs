use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharState {
    Inactive,
    Current,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Character {
    pub ch: char,
    pub state: CharState,
}

impl Character {
    fn new(ch: char) -> Self {
        Self {
            ch,
            state: CharState::Inactive,
        }
    }
}

/// A run of non-space characters. The separating spaces are never stored;
/// they are validated as transitions between words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Word {
    pub characters: Vec<Character>,
}

impl Word {
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn text(&self) -> String {
        self.characters.iter().map(|c| c.ch).collect()
    }
}

/// Split `source` on single ASCII spaces. Every character starts `Inactive`
/// except the first character of the first word.
pub fn tokenize(source: &str) -> Vec<Word> {
    let mut words: Vec<Word> = source
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(|w| Word {
            characters: w.chars().map(Character::new).collect(),
        })
        .collect();

    if let Some(first) = words.first_mut().and_then(|w| w.characters.first_mut()) {
        first.state = CharState::Current;
    }
    words
}

/// Length of the source in chars (not bytes), spaces included.
pub fn total_chars(source: &str) -> usize {
    source.chars().count()
}

pub fn join_words(words: &[Word]) -> String {
    words.iter().map(Word::text).collect::<Vec<_>>().join(" ")
}
