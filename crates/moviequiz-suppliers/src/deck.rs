//! Offline question supplier backed by a TOML deck.

use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use tokio::sync::Mutex;

use moviequiz_core::model::{Question, QuestionDeck};
use moviequiz_core::parser::parse_deck_str;
use moviequiz_core::traits::QuestionSupplier;

use crate::error::SupplierError;

/// Order in which deck questions are handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeckOrder {
    /// File order, wrapping around at the end.
    Sequential,
    /// A fresh shuffle every pass through the deck.
    #[default]
    Shuffled,
}

#[derive(Debug)]
enum DeckSource {
    File(PathBuf),
    Inline(QuestionDeck),
}

#[derive(Debug, Default)]
struct DeckState {
    deck: Option<QuestionDeck>,
    queue: VecDeque<usize>,
}

/// Supplies questions from a deck file, reading poster images from disk.
#[derive(Debug)]
pub struct DeckSupplier {
    source: DeckSource,
    order: DeckOrder,
    state: Mutex<DeckState>,
}

impl DeckSupplier {
    /// Supplier that reads `path` on `load_data`.
    pub fn from_path(path: impl Into<PathBuf>, order: DeckOrder) -> Self {
        Self::with_source(DeckSource::File(path.into()), order)
    }

    /// Supplier over an already parsed deck.
    pub fn from_deck(deck: QuestionDeck, order: DeckOrder) -> Self {
        Self::with_source(DeckSource::Inline(deck), order)
    }

    fn with_source(source: DeckSource, order: DeckOrder) -> Self {
        Self {
            source,
            order,
            state: Mutex::new(DeckState::default()),
        }
    }

    fn next_pass(&self, len: usize) -> VecDeque<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        if self.order == DeckOrder::Shuffled {
            indices.shuffle(&mut rand::thread_rng());
        }
        indices.into()
    }
}

#[async_trait]
impl QuestionSupplier for DeckSupplier {
    fn name(&self) -> &str {
        "deck"
    }

    async fn load_data(&self) -> anyhow::Result<()> {
        let deck = match &self.source {
            DeckSource::File(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read deck file: {}", path.display()))?;
                parse_deck_str(&content, path)?
            }
            DeckSource::Inline(deck) => deck.clone(),
        };

        if deck.questions.is_empty() {
            return Err(SupplierError::EmptyDeck(deck.name).into());
        }

        tracing::info!(deck = %deck.id, questions = deck.questions.len(), "deck loaded");
        let mut state = self.state.lock().await;
        state.queue = self.next_pass(deck.questions.len());
        state.deck = Some(deck);
        Ok(())
    }

    async fn next_question(&self) -> anyhow::Result<Option<Question>> {
        let entry = {
            let mut state = self.state.lock().await;
            let len = match &state.deck {
                Some(deck) => deck.questions.len(),
                None => return Err(SupplierError::NotLoaded.into()),
            };
            if state.queue.is_empty() {
                state.queue = self.next_pass(len);
            }
            let index = state.queue.pop_front();
            index.and_then(|i| state.deck.as_ref()?.questions.get(i).cloned())
        };

        let Some(entry) = entry else {
            return Ok(None);
        };

        let image = match &entry.image {
            Some(path) => match tokio::fs::read(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("failed to read poster {}: {e}", path.display());
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        Ok(Some(Question::new(image, entry.text, entry.correct_answer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviequiz_core::model::DeckQuestion;

    fn deck(n: usize) -> QuestionDeck {
        QuestionDeck {
            id: "test".into(),
            name: "Test".into(),
            description: String::new(),
            questions: (0..n)
                .map(|i| DeckQuestion {
                    text: format!("Question {i}"),
                    correct_answer: i % 2 == 0,
                    image: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn sequential_order_wraps_around() {
        let supplier = DeckSupplier::from_deck(deck(2), DeckOrder::Sequential);
        supplier.load_data().await.unwrap();

        let mut texts = Vec::new();
        for _ in 0..3 {
            texts.push(supplier.next_question().await.unwrap().unwrap().text);
        }
        assert_eq!(texts, vec!["Question 0", "Question 1", "Question 0"]);
    }

    #[tokio::test]
    async fn shuffled_pass_covers_every_question() {
        let supplier = DeckSupplier::from_deck(deck(5), DeckOrder::Shuffled);
        supplier.load_data().await.unwrap();

        let mut texts = Vec::new();
        for _ in 0..5 {
            texts.push(supplier.next_question().await.unwrap().unwrap().text);
        }
        texts.sort();
        let expected: Vec<String> = (0..5).map(|i| format!("Question {i}")).collect();
        assert_eq!(texts, expected);
    }

    #[tokio::test]
    async fn question_before_load_fails() {
        let supplier = DeckSupplier::from_deck(deck(1), DeckOrder::Sequential);
        let err = supplier.next_question().await.unwrap_err();
        assert!(err.to_string().contains("before data was loaded"));
    }

    #[tokio::test]
    async fn empty_deck_fails_to_load() {
        let supplier = DeckSupplier::from_deck(deck(0), DeckOrder::Sequential);
        let err = supplier.load_data().await.unwrap_err();
        assert!(err.to_string().contains("no questions"));
    }

    #[tokio::test]
    async fn missing_deck_file_fails_to_load() {
        let supplier = DeckSupplier::from_path("/nonexistent/deck.toml", DeckOrder::Sequential);
        let err = supplier.load_data().await.unwrap_err();
        assert!(format!("{err:#}").contains("failed to read deck file"));
    }

    #[tokio::test]
    async fn reads_images_relative_to_deck() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("posters")).unwrap();
        std::fs::write(dir.path().join("posters/a.gif"), b"GIF89a\x10\x00\x20\x00").unwrap();
        let deck_path = dir.path().join("deck.toml");
        std::fs::write(
            &deck_path,
            r#"
[deck]
id = "posters"
name = "Posters"

[[questions]]
text = "With poster"
correct_answer = true
image = "posters/a.gif"

[[questions]]
text = "Broken poster"
correct_answer = false
image = "posters/missing.gif"
"#,
        )
        .unwrap();

        let supplier = DeckSupplier::from_path(&deck_path, DeckOrder::Sequential);
        supplier.load_data().await.unwrap();

        let first = supplier.next_question().await.unwrap().unwrap();
        assert_eq!(first.text, "With poster");
        assert!(first.image.starts_with(b"GIF89a"));

        let second = supplier.next_question().await.unwrap().unwrap();
        assert!(second.image.is_empty());
        assert!(!second.correct_answer);
    }
}
