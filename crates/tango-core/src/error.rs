//! Error taxonomy for the ingest and search paths.
//!
//! Ingest errors are fatal to the run and surfaced to the operator. Search
//! infrastructure errors are surfaced to the caller; "no results" is not an
//! error at all, see [`crate::search::SearchOutcome`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Tantivy(#[from] tantivy::TantivyError),
    #[error(transparent)]
    OpenDirectory(#[from] tantivy::directory::error::OpenDirectoryError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Heed(#[from] heed::Error),
    #[error(transparent)]
    Encode(#[from] bincode::error::EncodeError),
    #[error(transparent)]
    Decode(#[from] bincode::error::DecodeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to open dictionary source: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode dictionary source: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("empty field at {id}")]
    EmptyField { id: String },
    #[error("store write failed: {0}")]
    Store(#[from] StoreError),
    #[error("index write failed: {0}")]
    Index(#[from] IndexError),
    #[error("import worker panicked: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("index query failed: {0}")]
    Index(#[from] IndexError),
    #[error("store lookup failed: {0}")]
    Store(#[from] StoreError),
}
