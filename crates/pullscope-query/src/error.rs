// File: crates/pullscope-query/src/error.rs
// Summary: Data-source failures; loaders turn them into `ChartError::DataUnavailable`.

use pullscope_core::QueryKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unknown encounter `{0}`")]
    UnknownEncounter(String),

    #[error("unknown pull `{pull}` for encounter `{encounter}`")]
    UnknownPull { encounter: String, pull: String },

    #[error("source unavailable for {key}: {reason}")]
    Unavailable { key: QueryKey, reason: String },

    #[error("sample file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type SourceResult<T> = Result<T, SourceError>;
