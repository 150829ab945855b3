// src/analysis/input.rs
//! Labels and the expansion of file/directory arguments into an ordered file list.

use crate::error::{JsgramError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

/// Class attached to a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "benign")]
    Benign,
    #[serde(rename = "malicious")]
    Malicious,
    #[default]
    #[serde(rename = "?")]
    Unknown,
}

impl Label {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Benign => "benign",
            Self::Malicious => "malicious",
            Self::Unknown => "?",
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "benign" => Ok(Self::Benign),
            "malicious" => Ok(Self::Malicious),
            "?" | "unknown" => Ok(Self::Unknown),
            other => Err(format!(
                "invalid label '{other}' (expected benign, malicious or ?)"
            )),
        }
    }
}

/// One file queued for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledPath {
    pub path: PathBuf,
    pub label: Label,
}

impl LabeledPath {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, label: Label) -> Self {
        Self {
            path: path.into(),
            label,
        }
    }

    #[must_use]
    pub fn unlabeled(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Label::Unknown)
    }
}

/// Builds the processing queue: the loose files in the order given, then
/// each directory's direct children in file-name order.
///
/// `dir_labels[i]` applies to every file of `dirs[i]`; missing labels are
/// `Unknown`.
///
/// # Errors
/// Returns error if more labels than inputs are given, or a directory cannot be listed.
pub fn expand_inputs(
    dirs: &[PathBuf],
    dir_labels: &[Label],
    files: &[PathBuf],
    file_labels: &[Label],
) -> Result<Vec<LabeledPath>> {
    check_label_count("directories", dirs.len(), dir_labels.len())?;
    check_label_count("files", files.len(), file_labels.len())?;

    let mut queue = Vec::new();
    for (i, file) in files.iter().enumerate() {
        let label = file_labels.get(i).copied().unwrap_or_default();
        queue.push(LabeledPath::new(file.clone(), label));
    }
    for (i, dir) in dirs.iter().enumerate() {
        let label = dir_labels.get(i).copied().unwrap_or_default();
        queue.extend(list_dir(dir)?.into_iter().map(|p| LabeledPath::new(p, label)));
    }
    Ok(queue)
}

fn check_label_count(what: &str, inputs: usize, labels: usize) -> Result<()> {
    if labels > inputs {
        return Err(JsgramError::Config(format!(
            "{labels} labels given for {inputs} {what}"
        )));
    }
    Ok(())
}

/// Regular files directly inside `dir`, sorted by name.
fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(JsgramError::io(
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            dir,
        ));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    tracing::debug!(dir = %dir.display(), files = files.len(), "Listed directory");
    Ok(files)
}
