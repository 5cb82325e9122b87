pub mod error;
pub mod high_score;

pub use error::PersistenceError;
pub use high_score::HighScoreStore;
