//! Errors raised by background content refresh

use std::time::Duration;
use thiserror::Error;

/// A background fetch failed; the provider keeps its last good content
#[derive(Debug, Error)]
pub enum ProviderRefreshError {
    #[error("content source unavailable: {0}")]
    Unavailable(String),

    #[error("refresh exceeded its {0:?} budget")]
    Timeout(Duration),

    #[error("content source I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed content: {0}")]
    Parse(#[from] serde_json::Error),
}
