pub mod selector;

use serde::{Deserialize, Serialize};

pub use selector::QuoteSelector;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub content: String,
}

impl Quote {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Built-in pool used when no script is configured or the quote source
/// cannot supply anything.
const DEFAULT_QUOTES: &[(&str, &str)] = &[
    ("default-1", "The quick brown fox jumps over the lazy dog."),
    ("default-2", "It was the best of times, it was the worst of times."),
    ("default-3", "To be or not to be, that is the question."),
    ("default-4", "All that glitters is not gold; not all those who wander are lost."),
    ("default-5", "The only way to do great work is to love what you do."),
    (
        "default-6",
        "When you have eliminated the impossible, whatever remains, however improbable, must be the truth.",
    ),
    ("default-7", "A journey of a thousand miles begins with a single step."),
    ("default-8", "The mass of men lead lives of quiet desperation."),
    (
        "default-9",
        "Success is not final, failure is not fatal: it is the courage to continue that counts.",
    ),
    ("default-10", "In the middle of difficulty lies opportunity."),
];

pub fn default_quotes() -> Vec<Quote> {
    DEFAULT_QUOTES
        .iter()
        .map(|&(id, content)| Quote::new(id, content))
        .collect()
}

/// One quote per non-blank line, with runs of whitespace collapsed to a
/// single space. Ids are `<script_id>-<n>`, counting from 1.
pub fn parse_quote_lines(script_id: &str, text: &str) -> Vec<Quote> {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, content)| Quote::new(format!("{script_id}-{}", i + 1), content))
        .collect()
}
