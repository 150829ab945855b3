// src/analysis/mod.rs
//! Corpus analysis: input queue, per-file pipeline, index writes, summary.

pub mod engine;
pub mod input;
pub mod summary;
pub mod worker;

pub use engine::{Analysis, Analyzer};
pub use input::{expand_inputs, Label, LabeledPath};
pub use summary::{AnalysisSummary, Exclusion, ExclusionReason};
