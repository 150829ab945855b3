// src/ngram/mod.rs
//! N-grams over code sequences.

pub mod profile;

pub use profile::{count_and_normalize, FileProfile};

use crate::error::{JsgramError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// An ordered tuple of exactly `n` unit codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NGram(Vec<u32>);

impl NGram {
    #[must_use]
    pub fn codes(&self) -> &[u32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Lets maps keyed by `NGram` be queried with a window slice.
impl Borrow<[u32]> for NGram {
    fn borrow(&self) -> &[u32] {
        &self.0
    }
}

impl From<&[u32]> for NGram {
    fn from(codes: &[u32]) -> Self {
        Self(codes.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for NGram {
    fn from(codes: [u32; N]) -> Self {
        Self(codes.to_vec())
    }
}

impl fmt::Display for NGram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{code}")?;
        }
        write!(f, ")")
    }
}

/// Validates a process-wide window size.
///
/// # Errors
/// Returns `InvalidNgramSize` when `n < 1`.
pub fn check_size(n: usize) -> Result<usize> {
    if n == 0 {
        return Err(JsgramError::InvalidNgramSize(n));
    }
    Ok(n)
}

/// Lazy, restartable stride-1 windows over a code sequence.
#[derive(Debug, Clone)]
pub struct Windows<'a> {
    inner: std::slice::Windows<'a, u32>,
}

impl<'a> Iterator for Windows<'a> {
    type Item = &'a [u32];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Windows<'_> {}

/// Slides a window of width `n` over `codes` in increasing start order.
///
/// Yields `max(0, len - n + 1)` windows. A sequence shorter than `n` yields
/// nothing and logs a warning; that is expected for comment-only files.
///
/// # Errors
/// Returns `InvalidNgramSize` when `n < 1`.
pub fn windows(codes: &[u32], n: usize) -> Result<Windows<'_>> {
    let n = check_size(n)?;
    if n > codes.len() {
        tracing::warn!(
            n,
            units = codes.len(),
            "The file has fewer syntactic units than the length of an n-gram"
        );
    }
    Ok(Windows {
        inner: codes.windows(n),
    })
}
