//! Error types for the rendering layer

use std::path::PathBuf;
use thiserror::Error;

/// Glyph data missing or unreadable
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("no glyph for {0:?}")]
    MissingGlyph(char),

    #[error("unknown font face '{0}'")]
    UnknownFace(String),

    #[error("failed to read font file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed BDF at line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// A provider failed while painting its content
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Font(#[from] FontLoadError),

    #[error("cannot render content: {0}")]
    Content(String),
}

/// The pixel sink rejected a frame
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame rejected: {0}")]
    Rejected(String),

    #[error("display disconnected")]
    Disconnected,
}
