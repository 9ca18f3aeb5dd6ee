//! Error types for smartmd library.

use std::io;
use thiserror::Error;

/// Result type alias for smartmd operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for smartmd library.
#[derive(Error, Debug)]
pub enum Error {
    /// The input could not be tokenized into an AST.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Deriving the content analysis failed (e.g. malformed node data).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// A formatting rule failed while transforming the AST.
    #[error("Formatting rule '{rule}' failed: {message}")]
    Formatting { rule: String, message: String },

    /// Serializing the formatted AST back to markdown failed.
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid formatter configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a formatting error attributed to the named rule.
    pub fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Formatting {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error came out of the parse stage.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    /// Returns true if this error came out of rule application or rendering.
    pub fn is_formatting(&self) -> bool {
        matches!(self, Error::Formatting { .. } | Error::Render(_))
    }
}
