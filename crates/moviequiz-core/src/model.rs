//! Core data model types for moviequiz.
//!
//! Questions as they arrive from a supplier, the view model the renderer
//! draws, and the record kept for each completed round.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::image::{self, ImageFormat};

/// A single yes/no question about a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Raw poster bytes. May be empty or undecodable.
    #[serde(default)]
    pub image: Vec<u8>,
    /// The question shown to the player.
    pub text: String,
    /// Whether "yes" is the right answer.
    pub correct_answer: bool,
}

impl Question {
    pub fn new(image: Vec<u8>, text: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            image,
            text: text.into(),
            correct_answer,
        }
    }
}

/// Image ready for display, or the placeholder used when the bytes could not
/// be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QuizImage {
    Decoded {
        format: ImageFormat,
        width: u32,
        height: u32,
        bytes: Vec<u8>,
    },
    #[default]
    Placeholder,
}

impl QuizImage {
    /// Decode poster bytes, falling back to the placeholder.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match image::probe(bytes) {
            Some(info) => QuizImage::Decoded {
                format: info.format,
                width: info.width,
                height: info.height,
                bytes: bytes.to_vec(),
            },
            None => QuizImage::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, QuizImage::Placeholder)
    }
}

impl fmt::Display for QuizImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizImage::Decoded {
                format,
                width,
                height,
                ..
            } => write!(f, "[{format} poster {width}x{height}]"),
            QuizImage::Placeholder => write!(f, "[no poster]"),
        }
    }
}

/// Everything the renderer needs to draw one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizStep {
    pub image: QuizImage,
    pub question: String,
    /// Position label, e.g. "3/10".
    pub question_number: String,
}

/// The recorded outcome of one completed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub id: Uuid,
    pub correct: u32,
    pub total: u32,
    pub date: DateTime<Utc>,
}

impl GameResult {
    pub fn new(correct: u32, total: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            correct,
            total,
            date: Utc::now(),
        }
    }

    /// Date in the short form shown in the round summary.
    pub fn date_time_string(&self) -> String {
        self.date.format("%d.%m.%y %H:%M").to_string()
    }
}

/// A question as written in a deck file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckQuestion {
    pub text: String,
    pub correct_answer: bool,
    /// Poster path, already resolved against the deck file's directory.
    #[serde(default)]
    pub image: Option<PathBuf>,
}

/// A collection of offline questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDeck {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<DeckQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_bytes_become_placeholder() {
        assert!(QuizImage::from_bytes(&[]).is_placeholder());
        assert!(QuizImage::from_bytes(b"definitely not an image").is_placeholder());
    }

    #[test]
    fn date_time_string_format() {
        let result = GameResult {
            id: Uuid::nil(),
            correct: 8,
            total: 10,
            date: Utc.with_ymd_and_hms(2026, 10, 19, 14, 3, 0).unwrap(),
        };
        assert_eq!(result.date_time_string(), "19.10.26 14:03");
    }

    #[test]
    fn game_result_serde_roundtrip() {
        let result = GameResult::new(7, 10);
        let json = serde_json::to_string(&result).unwrap();
        let back: GameResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn placeholder_display() {
        assert_eq!(QuizImage::Placeholder.to_string(), "[no poster]");
    }
}
