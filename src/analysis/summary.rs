// src/analysis/summary.rs
use crate::extract::ExtractionFailure;
use crate::units::MappingError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Why a file contributed no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    Extraction(ExtractionFailure),
    UnknownUnit(String),
    /// Fewer syntactic units than `n`, including empty files.
    InsufficientTokens,
}

impl ExclusionReason {
    /// Short category used to group exclusions in the summary.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Extraction(ExtractionFailure::NotParseable) => "not JavaScript",
            Self::Extraction(ExtractionFailure::PartiallyParseable) => "malformed JavaScript",
            Self::Extraction(ExtractionFailure::SystemError(_)) => "system error",
            Self::UnknownUnit(_) => "unknown syntactic unit",
            Self::InsufficientTokens => "insufficient tokens",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extraction(e) => write!(f, "{e}"),
            Self::UnknownUnit(label) => write!(f, "unknown syntactic unit '{label}'"),
            Self::InsufficientTokens => f.write_str("insufficient tokens"),
        }
    }
}

impl From<ExtractionFailure> for ExclusionReason {
    fn from(e: ExtractionFailure) -> Self {
        Self::Extraction(e)
    }
}

impl From<MappingError> for ExclusionReason {
    fn from(e: MappingError) -> Self {
        match e {
            MappingError::UnknownUnit(label) => Self::UnknownUnit(label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub path: PathBuf,
    pub reason: ExclusionReason,
}

/// End-of-batch counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub analyzed: usize,
    pub excluded: Vec<Exclusion>,
    /// Dictionary n-gram occurrences dropped because the vector space was full.
    pub dropped_ngrams: usize,
    /// Dictionary n-grams first assigned during this batch.
    pub new_ngrams: usize,
    /// Hash mode only: distinct n-grams sharing a coordinate with another.
    pub collisions: Option<usize>,
}

impl AnalysisSummary {
    #[must_use]
    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }

    /// Exclusion counts per reason category, sorted by category name.
    #[must_use]
    pub fn exclusions_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for e in &self.excluded {
            *counts.entry(e.reason.kind()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusions_grouped_by_kind() {
        let summary = AnalysisSummary {
            excluded: vec![
                Exclusion {
                    path: "a.js".into(),
                    reason: ExclusionReason::InsufficientTokens,
                },
                Exclusion {
                    path: "b.js".into(),
                    reason: ExtractionFailure::NotParseable.into(),
                },
                Exclusion {
                    path: "c.js".into(),
                    reason: ExclusionReason::InsufficientTokens,
                },
            ],
            ..AnalysisSummary::default()
        };
        let kinds = summary.exclusions_by_kind();
        assert_eq!(kinds.get("insufficient tokens"), Some(&2));
        assert_eq!(kinds.get("not JavaScript"), Some(&1));
        assert_eq!(summary.excluded_count(), 3);
    }

    #[test]
    fn reason_messages() {
        assert_eq!(ExclusionReason::InsufficientTokens.to_string(), "insufficient tokens");
        let r: ExclusionReason = MappingError::UnknownUnit("Foo".into()).into();
        assert_eq!(r.to_string(), "unknown syntactic unit 'Foo'");
    }
}
