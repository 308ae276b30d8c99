//! Error types for the project state store

use thiserror::Error;

/// State store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored timestamp could not be parsed
    #[error("Invalid timestamp '{value}' in column {column}")]
    Timestamp {
        /// Column holding the value
        column: &'static str,
        /// Raw stored value
        value: String,
        /// Parse failure
        #[source]
        source: chrono::ParseError,
    },
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;
