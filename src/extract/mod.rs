// src/extract/mod.rs
//! Syntactic-unit extraction through the external parser.

pub mod framing;
pub mod runner;

pub use framing::parse_units;
pub use runner::ExternalParser;

use std::path::Path;
use thiserror::Error;

/// Why a file produced no unit sequence. Always local to that one file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionFailure {
    /// The parser did not recognize the input as JavaScript at all.
    #[error("not JavaScript")]
    NotParseable,
    /// The parser recognized some structure but hit a syntax error.
    #[error("malformed JavaScript")]
    PartiallyParseable,
    /// Spawn failure, I/O error, timeout, or an unexpected exit code.
    #[error("system error: {0}")]
    SystemError(String),
}

/// Produces the ordered syntactic-unit labels of one file.
///
/// Implementations must not touch shared state; the orchestrator calls
/// them from several threads at once.
pub trait UnitExtractor: Sync {
    /// # Errors
    /// Returns the failure class when no unit sequence could be produced.
    fn extract(&self, path: &Path) -> Result<Vec<String>, ExtractionFailure>;
}

impl<T: UnitExtractor + ?Sized> UnitExtractor for &T {
    fn extract(&self, path: &Path) -> Result<Vec<String>, ExtractionFailure> {
        (**self).extract(path)
    }
}
