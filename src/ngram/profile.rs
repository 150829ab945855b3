// src/ngram/profile.rs
//! Per-file n-gram frequency profiles.

use super::NGram;
use std::collections::HashMap;

/// Normalized n-gram frequencies for one file.
///
/// Entries keep first-seen order so dictionary coordinates are assigned
/// deterministically. Frequencies sum to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct FileProfile {
    entries: Vec<(NGram, f64)>,
    total_windows: usize,
}

impl FileProfile {
    /// Distinct n-grams with their normalized frequency, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&NGram, f64)> + '_ {
        self.entries.iter().map(|(g, p)| (g, *p))
    }

    #[must_use]
    pub fn get(&self, ngram: &[u32]) -> Option<f64> {
        self.entries
            .iter()
            .find(|(g, _)| g.codes() == ngram)
            .map(|(_, p)| *p)
    }

    /// Number of distinct n-grams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of windows the profile was built from.
    #[must_use]
    pub fn total_windows(&self) -> usize {
        self.total_windows
    }

    #[must_use]
    pub fn mass(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }
}

/// Counts each distinct n-gram and divides by the total window count.
///
/// Returns `None` when there are no windows at all, which the orchestrator
/// treats as "insufficient tokens".
pub fn count_and_normalize<'a, I>(windows: I) -> Option<FileProfile>
where
    I: IntoIterator<Item = &'a [u32]>,
{
    let mut order: Vec<&'a [u32]> = Vec::new();
    let mut counts: HashMap<&'a [u32], usize> = HashMap::new();
    let mut total = 0usize;

    for window in windows {
        total += 1;
        let count = counts.entry(window).or_insert(0);
        if *count == 0 {
            order.push(window);
        }
        *count += 1;
    }

    if total == 0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let entries = order
        .into_iter()
        .map(|g| {
            let count = counts.get(g).copied().unwrap_or(0);
            (NGram::from(g), count as f64 / total as f64)
        })
        .collect();

    Some(FileProfile {
        entries,
        total_windows: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngram::windows;

    #[test]
    fn small_corpus_bigram_profile() {
        let codes = [3, 1, 3, 1];
        let profile = count_and_normalize(windows(&codes, 2).unwrap()).unwrap();
        assert_eq!(profile.total_windows(), 3);
        assert_eq!(profile.len(), 2);
        assert!((profile.get(&[3, 1]).unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((profile.get(&[1, 3]).unwrap() - 1.0 / 3.0).abs() < 1e-12);

        let order: Vec<String> = profile.iter().map(|(g, _)| g.to_string()).collect();
        assert_eq!(order, vec!["(3, 1)", "(1, 3)"]);
    }

    #[test]
    fn no_windows_is_none_not_empty() {
        let codes: [u32; 0] = [];
        assert!(count_and_normalize(windows(&codes, 4).unwrap()).is_none());
    }

    #[test]
    fn mass_is_one() {
        let codes = [0, 1, 2, 0, 1, 2, 2, 2, 5];
        let profile = count_and_normalize(windows(&codes, 3).unwrap()).unwrap();
        assert!((profile.mass() - 1.0).abs() < 1e-9);
    }
}
