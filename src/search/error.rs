use thiserror::Error;

/// Search failures. An empty result is never an error.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The status filter names no known status.
    #[error("Status '{0}' not found")]
    InvalidFilter(String),
    /// The record store failed; not retried here.
    #[error("record store unavailable: {0:#}")]
    StoreUnavailable(anyhow::Error),
}
