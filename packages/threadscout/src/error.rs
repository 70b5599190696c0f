//! Typed errors for the threadscout library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur during matching and crawling.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// The source rejected the credential (401/403). Fatal for the crawl,
    /// never retried.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A fetch kept failing after the retry budget was spent.
    #[error("fetch failed after {attempts} attempts: {url}")]
    RetriesExhausted { url: String, attempts: u32 },

    /// Structured API error
    #[error("API error: {0}")]
    Api(#[from] uservoice_client::UserVoiceError),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Invalid query provided
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// A page could not be interpreted at all (no fallback applied).
    #[error("parse error: {0}")]
    Parse(String),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,
}

impl ScoutError {
    /// Wrap a transport error.
    pub fn http(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Http(Box::new(err))
    }
}

/// Result type alias for scout operations.
pub type Result<T> = std::result::Result<T, ScoutError>;
