//! Error types for the core module.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur during playground operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Variable set not found: {0}")]
    VariableSetNotFound(String),

    #[error("No prompt selected")]
    NoPromptSelected,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Completion service error: {0}")]
    Runner(#[from] promptlab_runner::RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
