//! Game history stores.
//!
//! `JsonStatisticsStore` keeps every completed round in a JSON file and
//! rewrites it atomically on each record. `InMemoryStatisticsStore` is for
//! tests and throwaway sessions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StatisticsError;
use crate::model::GameResult;
use crate::statistics::{validate_result, StatisticsStore};

/// On-disk layout of the history file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    games: Vec<GameResult>,
}

/// History persisted to a JSON file.
#[derive(Debug)]
pub struct JsonStatisticsStore {
    path: PathBuf,
    games: Vec<GameResult>,
}

impl JsonStatisticsStore {
    /// Open the history at `path`. A missing file is an empty history; a
    /// file that fails to parse is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StatisticsError> {
        let path = path.into();
        let games = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let file: HistoryFile =
                    serde_json::from_str(&content).map_err(|source| StatisticsError::Corrupt {
                        path: path.clone(),
                        source,
                    })?;
                file.games
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StatisticsError::Io { path, source }),
        };

        tracing::debug!(path = %path.display(), games = games.len(), "opened game history");
        Ok(Self { path, games })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StatisticsError> {
        let file = HistoryFile {
            games: self.games.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let io_err = |source| StatisticsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        // Readers only ever see a complete file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        if let Err(source) = std::fs::rename(&tmp, &self.path) {
            if let Err(e) = std::fs::remove_file(&tmp) {
                tracing::warn!("failed to remove {}: {e}", tmp.display());
            }
            return Err(io_err(source));
        }
        Ok(())
    }
}

impl StatisticsStore for JsonStatisticsStore {
    fn record(&mut self, correct: u32, total: u32) -> Result<GameResult, StatisticsError> {
        validate_result(correct, total)?;

        let result = GameResult::new(correct, total);
        self.games.push(result.clone());
        if let Err(e) = self.persist() {
            self.games.pop();
            return Err(e);
        }
        Ok(result)
    }

    fn history(&self) -> &[GameResult] {
        &self.games
    }
}

/// History that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryStatisticsStore {
    games: Vec<GameResult>,
}

impl InMemoryStatisticsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatisticsStore for InMemoryStatisticsStore {
    fn record(&mut self, correct: u32, total: u32) -> Result<GameResult, StatisticsError> {
        validate_result(correct, total)?;
        let result = GameResult::new(correct, total);
        self.games.push(result.clone());
        Ok(result)
    }

    fn history(&self) -> &[GameResult] {
        &self.games
    }
}
