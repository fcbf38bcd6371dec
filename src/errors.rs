/*!
 * Error types for the cijsubs application.
 *
 * This module contains custom error types for the different stages of a run,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised while parsing a selection expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The expression does not match the numbers-and-ranges grammar
    #[error("Invalid input format: {0}. Expected numbers or ranges (e.g., 1,4-6,9-10).")]
    InvalidFormat(String),

    /// A range whose start is greater than its end
    #[error("Invalid range: {0}. Start must be <= end.")]
    InvalidRange(String),
}

/// Terminal failure of a fetch after every retry was used up
#[derive(Error, Debug)]
#[error("Failed to fetch after {attempts} attempts: {cause}")]
pub struct FetchError {
    /// Number of attempts made
    pub attempts: u32,
    /// Cause of the last failed attempt
    pub cause: String,
}

/// Errors that can occur while decoding and converting a transcript
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// The transcript response is missing fields or has wrong types
    #[error("Malformed transcript: {0}")]
    Malformed(String),

    /// A cue with an impossible time range
    #[error("Invalid timing in cue {index}")]
    InvalidTiming {
        /// Zero-based position of the cue
        index: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid selection expression
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Exhausted retries
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Transcript could not be converted
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// The catalog response could not be decoded
    #[error("Malformed catalog: {0}")]
    Catalog(String),
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
