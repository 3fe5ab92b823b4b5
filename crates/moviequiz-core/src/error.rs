//! Error types for the quiz core.
//!
//! Only two failures ever leave the controller: a data load failure, which is
//! shown to the player with a retry action, and a statistics persistence
//! failure, which aborts the controller loop. Stray input and undecodable
//! posters are handled silently and have no variant here.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from recording or loading the game history.
#[derive(Debug, Error)]
pub enum StatisticsError {
    /// A round result that cannot be recorded.
    #[error("invalid game result: {correct}/{total}")]
    InvalidResult { correct: u32, total: u32 },

    /// Reading or writing the history file failed.
    #[error("history file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The history file exists but does not parse.
    #[error("history file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The history could not be serialized.
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors surfaced by the quiz controller.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The question supplier could not load its data.
    #[error("failed to load questions: {0}")]
    DataLoad(String),

    /// A completed round could not be persisted.
    #[error("failed to record game: {0}")]
    Statistics(#[from] StatisticsError),
}
