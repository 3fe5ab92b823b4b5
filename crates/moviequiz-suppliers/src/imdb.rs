//! Online question supplier for IMDb-style "Top 250" movie APIs.
//!
//! `load_data` fetches the movie list once; every question picks a random
//! movie, downloads its poster and asks whether its rating beats a random
//! threshold.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::instrument;

use moviequiz_core::model::Question;
use moviequiz_core::traits::QuestionSupplier;

use crate::error::SupplierError;

const DEFAULT_BASE_URL: &str = "https://tv-api.com/en";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const POSTER_SIZE_SUFFIX: &str = "._V0_UX600_.jpg";

/// Movie list payload.
#[derive(Debug, Deserialize)]
struct MostPopularMovies {
    #[serde(rename = "errorMessage", default)]
    error_message: String,
    #[serde(default)]
    items: Vec<MostPopularMovie>,
}

#[derive(Debug, Clone, Deserialize)]
struct MostPopularMovie {
    title: String,
    rating: Rating,
    #[serde(rename = "imageURL")]
    image_url: String,
}

/// Ratings arrive as strings ("8.6") from the real API but as numbers from
/// some mirrors.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Rating {
    Number(f32),
    Text(String),
}

impl Rating {
    /// Unparsable or empty ratings count as zero.
    fn value(&self) -> f32 {
        match self {
            Rating::Number(n) => *n,
            Rating::Text(s) => s.trim().parse().unwrap_or(0.0),
        }
    }
}

/// Swap the size suffix of an IMDb poster URL for a larger rendition.
fn resized_image_url(url: &str) -> String {
    match url.find("._") {
        Some(idx) => format!("{}{POSTER_SIZE_SUFFIX}", &url[..idx]),
        None => url.to_string(),
    }
}

/// Supplier backed by a Top-250 movie list endpoint.
pub struct ImdbSupplier {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    movies: RwLock<Vec<MostPopularMovie>>,
}

impl ImdbSupplier {
    pub fn new(api_key: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            client,
            movies: RwLock::new(Vec::new()),
        })
    }

    fn map_request_error(e: reqwest::Error) -> SupplierError {
        if e.is_timeout() {
            SupplierError::Timeout(DEFAULT_TIMEOUT_SECS)
        } else {
            SupplierError::NetworkError(e.to_string())
        }
    }

    /// Poster bytes, or nothing if the download fails.
    async fn fetch_poster(&self, url: &str) -> Vec<u8> {
        let response = match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(status = response.status().as_u16(), url, "poster download failed");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(url, "poster download failed: {e}");
                return Vec::new();
            }
        };
        match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                tracing::warn!(url, "poster download failed: {e}");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl QuestionSupplier for ImdbSupplier {
    fn name(&self) -> &str {
        "imdb"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn load_data(&self) -> anyhow::Result<()> {
        let response = self
            .client
            .get(format!("{}/API/Top250Movies/{}", self.base_url, self.api_key))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(SupplierError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let payload: MostPopularMovies =
            response.json().await.map_err(|e| SupplierError::ApiError {
                status,
                message: format!("failed to parse movie list: {e}"),
            })?;

        if !payload.error_message.is_empty() {
            return Err(SupplierError::ServiceMessage(payload.error_message).into());
        }
        if payload.items.is_empty() {
            return Err(SupplierError::EmptyMovieList.into());
        }

        tracing::info!(movies = payload.items.len(), "movie list loaded");
        *self.movies.write().await = payload.items;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn next_question(&self) -> anyhow::Result<Option<Question>> {
        let (movie, threshold) = {
            let movies = self.movies.read().await;
            if movies.is_empty() {
                return Err(SupplierError::NotLoaded.into());
            }
            let mut rng = rand::thread_rng();
            let movie = movies.choose(&mut rng).cloned();
            (movie, rng.gen_range(7..=9))
        };
        let Some(movie) = movie else {
            return Ok(None);
        };

        let image = self.fetch_poster(&resized_image_url(&movie.image_url)).await;
        let rating = movie.rating.value();
        tracing::debug!(title = %movie.title, rating, threshold, "question ready");

        Ok(Some(Question::new(
            image,
            format!("Is the rating of this movie greater than {threshold}?"),
            rating > threshold as f32,
        )))
    }
}
