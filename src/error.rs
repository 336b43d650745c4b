// Error taxonomy for feed access, avatar caching and host events.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    /// Timeout or connection failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// Body could not be unwrapped or lacks required fields.
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Host event failed validation.
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}

pub type Result<T> = std::result::Result<T, LookupError>;
