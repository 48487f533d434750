//! Error types for persistence.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by storage backends.
///
/// The [`crate::PlaygroundStore`] contract does not surface these: reads fall
/// back to empty defaults and writes are fire-and-forget, so backends log them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
