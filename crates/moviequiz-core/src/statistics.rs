//! Aggregate statistics over the game history.

use serde::{Deserialize, Serialize};

use crate::error::StatisticsError;
use crate::model::GameResult;

/// Lifetime statistics derived from the recorded rounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of completed rounds.
    pub games_played: usize,
    /// The round with the most correct answers, if any.
    pub best_game: Option<GameResult>,
    /// Percentage of correct answers across every round.
    pub total_accuracy: f64,
}

/// The record with the most correct answers. Ties go to the earliest record.
pub fn best_game(history: &[GameResult]) -> Option<&GameResult> {
    history.iter().fold(None, |best, game| match best {
        Some(b) if b.correct >= game.correct => Some(b),
        _ => Some(game),
    })
}

/// `100 * Σcorrect / Σtotal`, or `0.0` for an empty history.
pub fn total_accuracy(history: &[GameResult]) -> f64 {
    let total: u64 = history.iter().map(|g| u64::from(g.total)).sum();
    if total == 0 {
        return 0.0;
    }
    let correct: u64 = history.iter().map(|g| u64::from(g.correct)).sum();
    100.0 * correct as f64 / total as f64
}

/// Compute aggregate statistics from all recorded rounds.
pub fn compute_statistics(history: &[GameResult]) -> Statistics {
    Statistics {
        games_played: history.len(),
        best_game: best_game(history).cloned(),
        total_accuracy: total_accuracy(history),
    }
}

/// Check a round result before it is recorded.
pub fn validate_result(correct: u32, total: u32) -> Result<(), StatisticsError> {
    if total == 0 || correct > total {
        return Err(StatisticsError::InvalidResult { correct, total });
    }
    Ok(())
}

/// Durable record of completed rounds.
pub trait StatisticsStore: Send {
    /// Append a round stamped with the current time.
    ///
    /// A failure to persist the round is returned, never swallowed.
    fn record(&mut self, correct: u32, total: u32) -> Result<GameResult, StatisticsError>;

    /// All recorded rounds in insertion order.
    fn history(&self) -> &[GameResult];

    fn games_count(&self) -> usize {
        self.history().len()
    }

    /// `None` when nothing has been recorded yet.
    fn best_game(&self) -> Option<&GameResult> {
        best_game(self.history())
    }

    fn total_accuracy(&self) -> f64 {
        total_accuracy(self.history())
    }

    fn statistics(&self) -> Statistics {
        compute_statistics(self.history())
    }
}
