use crate::analysis::Label;
use crate::config::{ExportFormat, UnknownUnitPolicy};
use crate::index::Strategy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jsgram", version, about = "Syntactic n-gram features for JavaScript")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Log more (-v info, -vv debug); `RUST_LOG` overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Configuration file [default: ./jsgram.toml]
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

/// Inputs and pipeline overrides shared by every corpus command.
#[derive(Args, Debug, Clone, Default)]
pub struct CorpusArgs {
    /// JavaScript file to analyze (repeatable)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub files: Vec<PathBuf>,
    /// Directory whose files are analyzed, non-recursively (repeatable)
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,
    /// Label of each --file, in order: benign, malicious or ?
    #[arg(long = "file-label", value_name = "LABEL")]
    pub file_labels: Vec<Label>,
    /// Label of each --dir, in order: benign, malicious or ?
    #[arg(long = "dir-label", value_name = "LABEL")]
    pub dir_labels: Vec<Label>,
    /// N-gram length
    #[arg(short = 'n', long = "ngram", value_name = "N")]
    pub n: Option<usize>,
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,
    /// Let the parser recover from some syntax errors
    #[arg(long)]
    pub tolerant: bool,
    /// What to do with files containing units the table does not know
    #[arg(long, value_enum)]
    pub unknown_unit: Option<UnknownUnitPolicy>,
    /// Process files one at a time
    #[arg(long)]
    pub sequential: bool,
}

impl CorpusArgs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract feature vectors and export them as a delimited matrix
    Analyze {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Output path; the extension follows the format
        #[arg(short, long, default_value = "features")]
        out: PathBuf,
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
    },
    /// Grow the persisted n-gram dictionary from a corpus
    UpdateIndex {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Train a model on a labelled corpus
    Train {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Where to save the model
        #[arg(short, long, value_name = "FILE")]
        model: PathBuf,
    },
    /// Add a labelled corpus to a saved model
    UpdateModel {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(short, long, value_name = "FILE")]
        model: PathBuf,
    },
    /// Classify a corpus with a saved model
    Classify {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(short, long, value_name = "FILE")]
        model: PathBuf,
        /// Probability of being malicious from which a sample is malicious
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Group a corpus into k families with k-means
    Cluster {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Number of clusters
        #[arg(short = 'k', long = "clusters", value_name = "K")]
        clusters: usize,
        /// Also print the inertia for every k up to MAX
        #[arg(long, value_name = "MAX")]
        elbow: Option<usize>,
    },
    /// Report whether files are valid JavaScript
    Check {
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        files: Vec<PathBuf>,
        #[arg(short = 'd', long = "dir", value_name = "DIR")]
        dirs: Vec<PathBuf>,
        #[arg(long)]
        tolerant: bool,
    },
}
