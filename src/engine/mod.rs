pub mod levels;
pub mod progression;

pub use levels::{GameLevel, LevelTable};
pub use progression::{LevelCompleted, ProgressUpdate, ProgressionEngine, UserProgress};
