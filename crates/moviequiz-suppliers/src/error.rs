//! Supplier error types.

use thiserror::Error;

/// Errors that can occur while loading questions.
#[derive(Debug, Error)]
pub enum SupplierError {
    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The movie service answered but reported an error in its payload.
    #[error("movie service error: {0}")]
    ServiceMessage(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The movie list came back empty.
    #[error("movie list is empty")]
    EmptyMovieList,

    /// The deck has no questions.
    #[error("deck '{0}' has no questions")]
    EmptyDeck(String),

    /// A question was requested before `load_data` succeeded.
    #[error("questions requested before data was loaded")]
    NotLoaded,
}
