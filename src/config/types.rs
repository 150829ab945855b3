use crate::index::{FeatureSizes, Strategy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default = "default_runtime")]
    pub runtime: String,
    #[serde(default = "default_script")]
    pub script: PathBuf,
    #[serde(default)]
    pub tolerant: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_table")]
    pub table: String,
    /// Custom JSON unit table; wins over `table` when set.
    #[serde(default)]
    pub table_path: Option<PathBuf>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            script: default_script(),
            tolerant: false,
            timeout_secs: default_timeout_secs(),
            table: default_table(),
            table_path: None,
        }
    }
}

fn default_runtime() -> String { "node".to_string() }
fn default_script() -> PathBuf { PathBuf::from("parsing/parser.js") }
const fn default_timeout_secs() -> u64 { 30 }
fn default_table() -> String { "esprima-ast-simplified".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NgramConfig {
    #[serde(default = "default_n")]
    pub n: usize,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self {
            n: default_n(),
            strategy: Strategy::default(),
            index_dir: default_index_dir(),
        }
    }
}

const fn default_n() -> usize { 4 }
fn default_index_dir() -> PathBuf { PathBuf::from("ngrams2int") }

/// What to do when a file emits a label the unit table does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnknownUnitPolicy {
    /// Exclude the offending file with a warning.
    #[default]
    Skip,
    /// Fail the whole batch before the index is touched.
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub unknown_unit: UnknownUnitPolicy,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { unknown_unit: UnknownUnitPolicy::default(), parallel: true }
    }
}

const fn default_true() -> bool { true }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    #[must_use]
    pub fn delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Trees grown by `train`.
    #[serde(default = "default_estimators")]
    pub estimators: usize,
    /// Trees added by each `update-model`.
    #[serde(default = "default_add_trees")]
    pub add_trees: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            estimators: default_estimators(),
            add_trees: default_add_trees(),
            max_depth: default_max_depth(),
            seed: 0,
        }
    }
}

const fn default_threshold() -> f64 { 0.29 }
const fn default_estimators() -> usize { 500 }
const fn default_add_trees() -> usize { 100 }
const fn default_max_depth() -> usize { 50 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// k-means runs with distinct seeds; the lowest inertia wins.
    #[serde(default = "default_restarts")]
    pub restarts: usize,
    #[serde(default)]
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_iter: default_max_iter(),
            restarts: default_restarts(),
            seed: 0,
        }
    }
}

const fn default_max_iter() -> usize { 300 }
const fn default_restarts() -> usize { 10 }

/// Contents of `jsgram.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub ngrams: NgramConfig,
    #[serde(default)]
    pub features: FeatureSizes,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
}
