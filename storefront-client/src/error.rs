//! Client-side error type

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, read, write)
    #[error("connection error: {0}")]
    Connection(String),

    /// HTTP request failed before a response arrived
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error envelope
    #[error("server error {code}: {message}")]
    Api { code: u16, message: String },

    /// Local pre-submit validation failed
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
