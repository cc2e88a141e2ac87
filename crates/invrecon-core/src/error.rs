//! Error types for the invrecon-core library.

use thiserror::Error;

/// Main error type for the invrecon library.
#[derive(Error, Debug)]
pub enum InvreconError {
    /// Fatal parse error for a single document.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors that abort parsing of a whole document.
///
/// Everything recoverable (missing prices, unmatched descriptions, price
/// mismatches) is reported as a warning on the parsed line items instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Neither vendor layout could be recognized from the text or filename.
    #[error("could not detect invoice vendor for '{filename}'")]
    VendorUndetected { filename: String },

    /// The document contains no text at all.
    #[error("document text is empty")]
    EmptyText,
}

/// Result type for the invrecon library.
pub type Result<T> = std::result::Result<T, InvreconError>;
