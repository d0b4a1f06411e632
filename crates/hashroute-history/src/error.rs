//! History error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History has already been activated")]
    AlreadyActivated,

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Route handler failed: {0}")]
    Handler(#[source] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures raised by a host environment's history primitives.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("History write rejected: {0}")]
    Rejected(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No previous history entry")]
    NoPreviousEntry,

    #[error("No next history entry")]
    NoNextEntry,

    #[error("Event listener failed: {0}")]
    Listener(#[source] Box<HistoryError>),
}
