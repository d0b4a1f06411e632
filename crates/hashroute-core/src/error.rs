//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("History error: {0}")]
    History(#[from] hashroute_history::HistoryError),

    #[error("Host error: {0}")]
    Host(#[from] hashroute_history::HostError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
