// src/config/mod.rs
pub mod types;

pub use self::types::{
    AnalysisConfig, ClusterConfig, Config, ExportConfig, ExportFormat, ModelConfig, NgramConfig,
    ParserConfig, UnknownUnitPolicy,
};

use crate::error::{JsgramError, Result};
use crate::units::UnitTable;
use std::fs;
use std::path::Path;

/// Looked up in the working directory by [`Config::load`].
pub const CONFIG_FILE: &str = "jsgram.toml";

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `jsgram.toml` from the working directory, or defaults if absent.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::from_path(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Loads an explicit configuration file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or fails validation.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| JsgramError::io(e, path))?;
        let config = Self::parse_toml(&content)
            .map_err(|e| JsgramError::Config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses and validates TOML content.
    ///
    /// # Errors
    /// Returns error on invalid TOML or invalid values.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| JsgramError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration.
    ///
    /// # Errors
    /// Returns error for `n == 0`, zero vector-space sizes, a zero timeout,
    /// or a threshold outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        crate::ngram::check_size(self.ngrams.n)?;
        if self.features.default_size == 0 || self.features.sizes.contains(&0) {
            return Err(JsgramError::Config(
                "vector-space sizes must be at least 1".to_string(),
            ));
        }
        if self.parser.timeout_secs == 0 {
            return Err(JsgramError::Config(
                "parser timeout must be at least 1 second".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.model.threshold) {
            return Err(JsgramError::Config(format!(
                "model threshold {} is outside [0, 1]",
                self.model.threshold
            )));
        }
        if self.model.estimators == 0 || self.model.add_trees == 0 || self.model.max_depth == 0 {
            return Err(JsgramError::Config(
                "model estimators, add_trees and max_depth must be at least 1".to_string(),
            ));
        }
        if self.cluster.max_iter == 0 || self.cluster.restarts == 0 {
            return Err(JsgramError::Config(
                "cluster max_iter and restarts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Vector-space size for the configured `n`.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features.for_n(self.ngrams.n)
    }

    /// The unit table matching the parser configuration.
    ///
    /// # Errors
    /// Returns error if the named table does not exist or the custom file is invalid.
    pub fn unit_table(&self) -> Result<UnitTable> {
        match &self.parser.table_path {
            Some(path) => UnitTable::from_json_file(path),
            None => UnitTable::builtin(&self.parser.table),
        }
    }
}
