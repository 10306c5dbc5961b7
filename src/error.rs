//! Crate-level error type
//!
//! Every variant is fatal to the invocation. Host resolution failures never
//! surface here; they are logged and the host is kept unresolved.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogsiftError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Query(#[from] crate::query::QueryError),

    #[error("Search failed: {0}")]
    Search(#[from] crate::search::SearchError),

    #[error("Failed to obtain credentials: {0}")]
    Credentials(#[from] crate::credentials::CredentialError),
}

impl LogsiftError {
    /// Usage errors are reported before any network access
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Query(e) if e.is_usage())
    }
}

pub type Result<T> = std::result::Result<T, LogsiftError>;
