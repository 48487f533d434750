//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors a single completion call can end in.
///
/// The batch executor turns every one of these into an errored result; none of
/// them abort a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },

    /// The service answered but reported an error in the body.
    #[error("{0}")]
    Application(String),

    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),

    #[error("Completion service not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for RunnerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RunnerError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
