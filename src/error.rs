//! # Error Module
//!
//! Library-level error types for an evaluation. The binary wraps these in
//! `anyhow` for reporting; everything below the host boundary returns
//! `Result<T, EvaluatorError>`.

use thiserror::Error;

use crate::transcript::Author;

/// Errors that end an evaluation.
///
/// # Rust Concept: Custom Error Types with thiserror
///
/// Each variant is one failure kind the host can match on. The
/// `#[error("...")]` attribute becomes the `Display` implementation.
#[derive(Error, Debug)]
pub enum EvaluatorError {
    /// One or both API keys were not supplied. No participant has run.
    #[error("Missing API key(s): {}", .0.join(", "))]
    MissingCredential(Vec<&'static str>),

    #[error("The startup idea must not be empty")]
    EmptyIdea,

    /// The model or search backend failed during a participant's turn.
    #[error("{participant} failed: {message}")]
    Backend {
        participant: Author,
        message: String,
    },

    #[error("Expected a reply from {expected}, got one authored by {actual}")]
    UnexpectedAuthor { expected: Author, actual: Author },

    /// The configured turn cap was reached without a final answer.
    #[error("No final answer after {turns} turns")]
    TurnLimitExceeded { turns: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EvaluatorError {
    /// Shorthand for a backend failure attributed to `participant`.
    pub fn backend(participant: Author, message: impl Into<String>) -> Self {
        EvaluatorError::Backend {
            participant,
            message: message.into(),
        }
    }

    /// True when the error means the user still has to supply credentials.
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, EvaluatorError::MissingCredential(_))
    }
}
