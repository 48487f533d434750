//! Error types for templates.

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while rendering a template.
///
/// Extraction never fails, so every variant here comes out of the renderer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template syntax error: {0}")]
    Syntax(String),

    #[error("Undefined variable: {0}")]
    Undefined(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Template rendering failed: {0}")]
    RenderingFailed(String),
}

impl TemplateError {
    /// Human-readable message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Syntax(msg)
            | Self::Undefined(msg)
            | Self::UnknownFilter(msg)
            | Self::RenderingFailed(msg) => msg,
        }
    }
}

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        let message = err.to_string();
        match err.kind() {
            ErrorKind::SyntaxError => Self::Syntax(message),
            ErrorKind::UndefinedError => Self::Undefined(message),
            ErrorKind::UnknownFilter => Self::UnknownFilter(message),
            _ => Self::RenderingFailed(message),
        }
    }
}
