// src/export.rs
//! Delimited-text export of a feature matrix for downstream ML tooling.
//!
//! ```text
//! Outlook,Label,0,1,2,...
//! a.js,benign,0.6666666666666666,0.3333333333333333,0,...
//! ```

use crate::analysis::{Analysis, Label};
use crate::config::ExportFormat;
use crate::error::{JsgramError, Result};
use crate::vector::FeatureMatrix;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// `base` with the extension matching `format`.
#[must_use]
pub fn output_path(base: &Path, format: ExportFormat) -> PathBuf {
    base.with_extension(format.extension())
}

/// Writes one header row and one row per file. Fields holding the
/// delimiter or quotes are quoted.
///
/// The `Label` column is present only when `labels` is given.
///
/// # Errors
/// Returns any error from the underlying writer.
pub fn write_matrix<W: Write>(
    out: W,
    file_names: &[String],
    matrix: &FeatureMatrix,
    labels: Option<&[Label]>,
    format: ExportFormat,
) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(out);

    let mut header = vec!["Outlook".to_string()];
    if labels.is_some() {
        header.push("Label".to_string());
    }
    header.extend((0..matrix.n_cols()).map(|col| col.to_string()));
    wtr.write_record(&header)?;

    for (i, name) in file_names.iter().enumerate() {
        let mut record = vec![name.clone()];
        if let Some(labels) = labels {
            record.push(labels.get(i).copied().unwrap_or_default().to_string());
        }
        let row = matrix.dense_row(i).unwrap_or_default();
        record.extend(row.iter().map(f64::to_string));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports an analysis to `path`. Labels are written when any is known.
///
/// # Errors
/// Returns `Io` if the file cannot be created or written.
pub fn export_analysis(analysis: &Analysis, path: &Path, format: ExportFormat) -> Result<()> {
    let labels = analysis
        .labels
        .iter()
        .any(|l| l.is_known())
        .then_some(analysis.labels.as_slice());

    let file = File::create(path).map_err(|e| JsgramError::io(e, path))?;
    write_matrix(
        BufWriter::new(file),
        &analysis.file_names,
        &analysis.matrix,
        labels,
        format,
    )
    .map_err(|e| JsgramError::io(io::Error::from(e), path))?;
    tracing::info!(
        path = %path.display(),
        rows = analysis.file_names.len(),
        cols = analysis.matrix.n_cols(),
        "Exported feature matrix"
    );
    Ok(())
}
