// src/extract/framing.rs
//! Decoding of the external parser's stdout.
//!
//! The parser prints one syntactic-unit label per line. Some wrappers frame
//! the whole payload as a quoted byte-string literal, `b'Program\nLiteral\n'`,
//! with the line breaks escaped. Both shapes decode to the same label list.

use regex::Regex;
use std::sync::LazyLock;

/// Opaque prefix ending in the opening quote, e.g. `b'`.
static FRAME_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{0,2}'").unwrap_or_else(|_| panic!("Invalid Regex")));

/// Extracts the ordered unit labels from parser output.
#[must_use]
pub fn parse_units(stdout: &str) -> Vec<String> {
    let trimmed = stdout.trim_end_matches(['\r', '\n']);
    let body = match FRAME_OPEN.find(trimmed) {
        Some(m) => {
            let inner = &trimmed[m.end()..];
            inner.strip_suffix('\'').unwrap_or(inner)
        }
        None => trimmed,
    };

    body.split('\n')
        .flat_map(|line| line.split("\\n"))
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}
