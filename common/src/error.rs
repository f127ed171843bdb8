//! Error types

use thiserror::Error;

/// Common error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("Row at line {line} of {path} has {found} fields, header has {expected}")]
    TooManyFields {
        path: String,
        line: u64,
        found: usize,
        expected: usize,
    },

    #[error("No header row in {0}")]
    MissingHeader(String),

    #[error("Invalid pair: {0}")]
    InvalidPair(String),
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;
