//! Error types for Papyr domain values.

use thiserror::Error;

/// Rejected construction of a domain value.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Result type alias using Papyr's Error.
pub type Result<T> = std::result::Result<T, Error>;
