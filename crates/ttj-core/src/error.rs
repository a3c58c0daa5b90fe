//! Error types for the ttj-core library.

use thiserror::Error;

/// Main error type for the ttj library.
#[derive(Error, Debug)]
pub enum TtjError {
    /// Configuration error (invalid thresholds, empty lookback, etc.).
    #[error("configuration error: {0}")]
    Config(String),

    /// Reference data error (unusable canonical list).
    #[error("reference data error for {category}: {reason}")]
    Reference { category: String, reason: String },
}

/// Result type for the ttj library.
pub type Result<T> = std::result::Result<T, TtjError>;
