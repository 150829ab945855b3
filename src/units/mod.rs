// src/units/mod.rs
//! Syntactic-unit tables and the unit-to-code mapper.
//!
//! A [`UnitTable`] is loaded once at startup and never mutated. Every label
//! the configured parser can emit must be present; an absent label is a
//! table/grammar drift and is reported as [`MappingError::UnknownUnit`].

pub mod tables;

use crate::error::{JsgramError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Names of the built-in tables, as accepted in `parser.table`.
pub const BUILTIN_TABLES: &[&str] = &["esprima-ast", "esprima-ast-simplified", "esprima-tokens"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("unknown syntactic unit '{0}'")]
    UnknownUnit(String),
}

/// Immutable mapping from syntactic-unit label to a small integer code.
#[derive(Debug, Clone)]
pub struct UnitTable {
    name: String,
    codes: HashMap<String, u32>,
}

#[derive(Deserialize)]
struct UnitTableFile {
    name: String,
    units: HashMap<String, u32>,
}

impl UnitTable {
    #[must_use]
    pub fn new(name: impl Into<String>, codes: HashMap<String, u32>) -> Self {
        Self {
            name: name.into(),
            codes,
        }
    }

    /// Looks up one of the built-in tables by name.
    ///
    /// # Errors
    /// Returns `Config` if the name is not a built-in table.
    pub fn builtin(name: &str) -> Result<Self> {
        let codes = match name {
            "esprima-ast" => tables::esprima_ast(),
            "esprima-ast-simplified" => tables::esprima_ast_simplified(),
            "esprima-tokens" => tables::esprima_tokens(),
            other => {
                return Err(JsgramError::Config(format!(
                    "unknown unit table '{other}' (expected one of: {})",
                    BUILTIN_TABLES.join(", ")
                )))
            }
        };
        Ok(Self::new(name, codes))
    }

    /// Loads a custom table from a JSON file: `{ "name": ..., "units": { label: code } }`.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not valid JSON, or is empty.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| JsgramError::io(e, path))?;
        let file: UnitTableFile =
            serde_json::from_str(&content).map_err(|e| JsgramError::UnitTable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if file.units.is_empty() {
            return Err(JsgramError::UnitTable {
                path: path.to_path_buf(),
                reason: "table has no units".to_string(),
            });
        }
        if file.name.trim().is_empty() || file.name.contains(['/', '\\']) {
            return Err(JsgramError::UnitTable {
                path: path.to_path_buf(),
                reason: format!("invalid table name '{}'", file.name),
            });
        }
        Ok(Self::new(file.name, file.units))
    }

    /// Table name; part of the persisted index key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn code(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Number of distinct codes (less than `len()` for simplified tables).
    #[must_use]
    pub fn distinct_codes(&self) -> usize {
        let mut codes: Vec<u32> = self.codes.values().copied().collect();
        codes.sort_unstable();
        codes.dedup();
        codes.len()
    }

    /// Maps a unit sequence to its code sequence, preserving order.
    ///
    /// # Errors
    /// Returns `UnknownUnit` on the first label absent from the table.
    pub fn map_to_codes<S: AsRef<str>>(&self, units: &[S]) -> std::result::Result<Vec<u32>, MappingError> {
        units
            .iter()
            .map(|unit| {
                let label = unit.as_ref();
                self.code(label)
                    .ok_or_else(|| MappingError::UnknownUnit(label.to_string()))
            })
            .collect()
    }
}
