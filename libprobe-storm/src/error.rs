use crate::source::SourceError;
use thiserror::Error;

/// Errors that stop a scan before any probing starts.
///
/// Per-candidate failures never show up here.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
