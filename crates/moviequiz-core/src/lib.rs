//! moviequiz-core: quiz engine, score history, and round controller.
//!
//! This crate defines the quiz state machine, the game history and its
//! aggregates, and the controller that connects them to a question supplier
//! and a rendering surface.

pub mod controller;
pub mod engine;
pub mod error;
pub mod history;
pub mod image;
pub mod model;
pub mod parser;
pub mod statistics;
pub mod traits;
pub mod ui;

pub use controller::{ControllerConfig, QuizController, QuizEvent};
pub use engine::{Advance, AnswerOutcome, QuizEngine, QuizState};
pub use error::{QuizError, StatisticsError};
pub use history::{InMemoryStatisticsStore, JsonStatisticsStore};
pub use statistics::{Statistics, StatisticsStore};
