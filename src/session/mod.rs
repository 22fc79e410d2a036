pub mod input;
pub mod result;
pub mod stats;
pub mod timer;
pub mod tokenizer;

pub use input::{SessionEvent, Transition, TypingSession};
pub use result::{SessionCompleted, SessionRecord};
pub use stats::{CharCounts, TypingStats};
