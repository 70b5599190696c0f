use thiserror::Error;

/// Errors from the UserVoice API client.
#[derive(Debug, Error)]
pub enum UserVoiceError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the bearer token.
    #[error("authentication rejected (HTTP {status})")]
    Auth { status: u16 },

    /// Non-success response other than an auth rejection.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, UserVoiceError>;
