//! moviequiz-suppliers: question sources for the quiz.
//!
//! Implements the `QuestionSupplier` trait for offline TOML decks and for an
//! IMDb-style "Top 250" movie API.

pub mod config;
pub mod deck;
pub mod error;
pub mod imdb;

pub use config::{create_supplier, load_config, load_config_from, QuizConfig, SupplierConfig};
pub use deck::{DeckOrder, DeckSupplier};
pub use error::SupplierError;
pub use imdb::ImdbSupplier;
