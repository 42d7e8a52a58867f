//! Error types for letter_search.
//!
//! Infeasible constraints and an exhausted search are not errors: the
//! enforcer answers `None` and the searcher answers `Ok(None)`.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The search input was rejected at construction time
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The bigram table could not be loaded
    #[error("Invalid statistics: {message}")]
    Statistics { message: String },

    /// A bigram lookup produced a value that cannot be scored
    #[error("Corrupt statistics for pair {pair:?}")]
    CorruptStatistics { pair: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl SearchError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn statistics(message: impl Into<String>) -> Self {
        Self::Statistics {
            message: message.into(),
        }
    }

    pub fn corrupt_statistics(first: char, second: char) -> Self {
        Self::CorruptStatistics {
            pair: format!("{first}{second}"),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Configuration errors are the caller's to fix; retrying cannot help.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
