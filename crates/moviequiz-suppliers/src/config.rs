//! Quiz configuration and supplier factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use moviequiz_core::controller::ControllerConfig;
use moviequiz_core::engine::DEFAULT_QUESTIONS_AMOUNT;
use moviequiz_core::traits::QuestionSupplier;

use crate::deck::{DeckOrder, DeckSupplier};
use crate::imdb::ImdbSupplier;

/// Where questions come from.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SupplierConfig {
    Deck {
        path: PathBuf,
        #[serde(default = "default_shuffle")]
        shuffle: bool,
    },
    Imdb {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl std::fmt::Debug for SupplierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupplierConfig::Deck { path, shuffle } => f
                .debug_struct("Deck")
                .field("path", path)
                .field("shuffle", shuffle)
                .finish(),
            SupplierConfig::Imdb {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Imdb")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_shuffle() -> bool {
    true
}

/// Top-level moviequiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Question source. `play --deck` overrides it.
    #[serde(default)]
    pub supplier: Option<SupplierConfig>,
    /// Questions per round.
    #[serde(default = "default_questions_amount")]
    pub questions_amount: usize,
    /// Pause after an answer before the next question, in milliseconds.
    #[serde(default = "default_answer_delay")]
    pub answer_delay_ms: u64,
    /// Game history file.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
}

fn default_questions_amount() -> usize {
    DEFAULT_QUESTIONS_AMOUNT
}
fn default_answer_delay() -> u64 {
    1000
}
fn default_history_path() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("moviequiz")
            .join("history.json"),
        Err(_) => PathBuf::from("./moviequiz-history.json"),
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            supplier: None,
            questions_amount: default_questions_amount(),
            answer_delay_ms: default_answer_delay(),
            history_path: default_history_path(),
        }
    }
}

impl QuizConfig {
    /// Round settings for the controller.
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            questions_amount: self.questions_amount,
            answer_delay: Duration::from_millis(self.answer_delay_ms),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_supplier_config(config: &SupplierConfig) -> SupplierConfig {
    match config {
        SupplierConfig::Deck { path, shuffle } => SupplierConfig::Deck {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
            shuffle: *shuffle,
        },
        SupplierConfig::Imdb { api_key, base_url } => SupplierConfig::Imdb {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `moviequiz.toml` in the current directory
/// 2. `~/.config/moviequiz/config.toml`
///
/// Environment variable override: `MOVIEQUIZ_IMDB_KEY`.
pub fn load_config() -> Result<QuizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("moviequiz.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizConfig::default(),
    };

    if let Ok(key) = std::env::var("MOVIEQUIZ_IMDB_KEY") {
        apply_imdb_key(&mut config, key);
    }

    config.supplier = config.supplier.as_ref().map(resolve_supplier_config);
    Ok(config)
}

fn parse_config(content: &str) -> Result<QuizConfig> {
    Ok(toml::from_str::<QuizConfig>(content)?)
}

/// Set the API key, switching to the online supplier when none is configured.
fn apply_imdb_key(config: &mut QuizConfig, key: String) {
    match &mut config.supplier {
        Some(SupplierConfig::Imdb { api_key, .. }) => *api_key = key,
        Some(SupplierConfig::Deck { .. }) => {}
        None => {
            config.supplier = Some(SupplierConfig::Imdb {
                api_key: key,
                base_url: None,
            })
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("moviequiz"))
}

/// Create a supplier instance from its configuration.
pub fn create_supplier(config: &SupplierConfig) -> Result<Arc<dyn QuestionSupplier>> {
    match config {
        SupplierConfig::Deck { path, shuffle } => {
            let order = if *shuffle {
                DeckOrder::Shuffled
            } else {
                DeckOrder::Sequential
            };
            Ok(Arc::new(DeckSupplier::from_path(path, order)))
        }
        SupplierConfig::Imdb { api_key, base_url } => {
            anyhow::ensure!(!api_key.is_empty(), "imdb supplier requires an api_key");
            Ok(Arc::new(ImdbSupplier::new(api_key, base_url.clone())?))
        }
    }
}
