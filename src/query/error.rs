//! Query error types
//!
//! Errors raised while validating selection criteria and building the
//! search body. All of them are reported before any network access.

use thiserror::Error;

/// Errors that can occur while building a query
#[derive(Error, Debug)]
pub enum QueryError {
    /// Conflicting or missing selection criteria
    #[error("Usage error: {0}")]
    Usage(String),

    /// Relative or absolute window that cannot be interpreted
    #[error("Invalid time window: {0}")]
    InvalidTimeWindow(String),

    /// Body could not be serialized
    #[error("Failed to serialize query: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl QueryError {
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_) | Self::InvalidTimeWindow(_))
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
