//! TOML question deck parser.
//!
//! Loads offline question decks from TOML files and directories, and
//! validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::image;
use crate::model::{DeckQuestion, QuestionDeck};

/// Intermediate TOML structure for parsing deck files.
#[derive(Debug, Deserialize)]
struct TomlDeckFile {
    deck: TomlDeckHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlDeckHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    text: String,
    correct_answer: bool,
    #[serde(default)]
    image: Option<String>,
}

/// Parse a single TOML file into a `QuestionDeck`.
pub fn parse_deck(path: &Path) -> Result<QuestionDeck> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read deck file: {}", path.display()))?;

    parse_deck_str(&content, path)
}

/// Parse a TOML string into a `QuestionDeck`. Image paths are resolved
/// against the directory of `source_path`.
pub fn parse_deck_str(content: &str, source_path: &Path) -> Result<QuestionDeck> {
    let parsed: TomlDeckFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let base_dir = source_path.parent().unwrap_or_else(|| Path::new(""));

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| DeckQuestion {
            text: q.text.trim().to_string(),
            correct_answer: q.correct_answer,
            image: q.image.map(|image| base_dir.join(image)),
        })
        .collect();

    Ok(QuestionDeck {
        id: parsed.deck.id,
        name: parsed.deck.name,
        description: parsed.deck.description,
        questions,
    })
}

/// Recursively load all `.toml` deck files from a directory.
pub fn load_deck_directory(dir: &Path) -> Result<Vec<QuestionDeck>> {
    let mut decks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            decks.extend(load_deck_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_deck(&path) {
                Ok(deck) => decks.push(deck),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(decks)
}

/// A warning from deck validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based question number (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a deck for common issues. `questions_amount` is the round
/// length the deck will be played with.
pub fn validate_deck(deck: &QuestionDeck, questions_amount: usize) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if deck.questions.len() < questions_amount {
        warnings.push(ValidationWarning {
            question: None,
            message: format!(
                "deck has {} questions but a round needs {questions_amount}; questions will repeat",
                deck.questions.len()
            ),
        });
    }

    let mut seen = HashSet::new();
    for (i, q) in deck.questions.iter().enumerate() {
        let number = Some(i + 1);

        if q.text.is_empty() {
            warnings.push(ValidationWarning {
                question: number,
                message: "question text is empty".into(),
            });
        } else if !seen.insert((q.text.as_str(), q.image.as_deref())) {
            warnings.push(ValidationWarning {
                question: number,
                message: format!("duplicate question: {}", q.text),
            });
        }

        match &q.image {
            Some(image) if !image.is_file() => warnings.push(ValidationWarning {
                question: number,
                message: format!("image not found: {}", image.display()),
            }),
            Some(image) if !is_decodable(image) => warnings.push(ValidationWarning {
                question: number,
                message: format!(
                    "image is not a PNG, GIF or JPEG; a placeholder will be shown: {}",
                    image.display()
                ),
            }),
            None => warnings.push(ValidationWarning {
                question: number,
                message: "no image; a placeholder will be shown".into(),
            }),
            _ => {}
        }
    }

    warnings
}

fn is_decodable(path: &Path) -> bool {
    std::fs::read(path).is_ok_and(|bytes| image::probe(&bytes).is_some())
}
