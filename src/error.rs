// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole batch.
///
/// Per-file problems (extraction failures, short files) never surface here;
/// they exclude the one file and are reported in the analysis summary.
#[derive(Debug, Error)]
pub enum JsgramError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Invalid n-gram size {0}: n must be at least 1")]
    InvalidNgramSize(usize),

    #[error("Invalid unit table {path}: {reason}")]
    UnitTable { path: PathBuf, reason: String },

    #[error("Corrupt n-gram index {path}: {reason}")]
    IndexFormat { path: PathBuf, reason: String },

    #[error("N-gram index mismatch: expected {expected}, found {found}")]
    IndexMismatch { expected: String, found: String },

    #[error("Unknown syntactic unit '{label}' in {file}")]
    UnknownUnit { file: PathBuf, label: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, JsgramError>;

impl JsgramError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

// Directory listing errors keep the path they happened on.
impl From<walkdir::Error> for JsgramError {
    fn from(e: walkdir::Error) -> Self {
        let path = e.path().map_or_else(|| PathBuf::from("<unknown>"), PathBuf::from);
        match e.into_io_error() {
            Some(source) => JsgramError::Io { source, path },
            None => JsgramError::Config(format!("filesystem loop at {}", path.display())),
        }
    }
}
