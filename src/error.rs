//! Library error type
//!
//! Extraction itself never fails: malformed manifests simply contribute
//! nothing. Only faults of the file-reading collaborator surface here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
