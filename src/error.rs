//! Error types for this crate

use thiserror::Error;

/// Result type alias used throughout this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong during a run
#[derive(Debug, Error)]
pub enum Error {
    /// The Classroom API answered with a non-success HTTP status
    #[error("Classroom API error (HTTP {status}) when requesting {url}: {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    /// The request could not be sent, or its response could not be read
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The OAuth flow (interactive authorization or token refresh) failed
    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("unable to locate the home directory")]
    NoHomeDirectory,
}

impl Error {
    /// Whether this error was reported by the remote API itself (as opposed to a transport, auth or local failure)
    pub fn is_api_error(&self) -> bool {
        match self {
            Error::Api{ .. } => true,
            _ => false,
        }
    }
}
