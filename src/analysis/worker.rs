//! Per-file pipeline: extract, map, window, count.
//!
//! Pure with respect to the index, so it can run on any thread.

use std::path::Path;

use crate::extract::UnitExtractor;
use crate::ngram::{count_and_normalize, windows, FileProfile};
use crate::units::UnitTable;

use super::summary::ExclusionReason;

/// Builds the n-gram profile of one file, or the reason it has none.
///
/// `n` must already be validated.
pub fn profile_file<E: UnitExtractor + ?Sized>(
    path: &Path,
    extractor: &E,
    table: &UnitTable,
    n: usize,
) -> Result<FileProfile, ExclusionReason> {
    let units = extractor.extract(path)?;
    let codes = table.map_to_codes(&units)?;
    let windows = windows(&codes, n).map_err(|_| ExclusionReason::InsufficientTokens)?;
    count_and_normalize(windows).ok_or(ExclusionReason::InsufficientTokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionFailure;
    use std::collections::HashMap;

    struct Fixed(std::result::Result<Vec<String>, ExtractionFailure>);

    impl UnitExtractor for Fixed {
        fn extract(&self, _: &Path) -> std::result::Result<Vec<String>, ExtractionFailure> {
            self.0.clone()
        }
    }

    fn table() -> UnitTable {
        let codes: HashMap<String, u32> = [("A", 3), ("B", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        UnitTable::new("t", codes)
    }

    fn units(labels: &[&str]) -> Fixed {
        Fixed(Ok(labels.iter().map(|s| (*s).to_string()).collect()))
    }

    #[test]
    fn profile_of_a_small_file() {
        let p = profile_file(Path::new("f.js"), &units(&["A", "B", "A", "B"]), &table(), 2).unwrap();
        assert_eq!(p.get(&[3, 1]), Some(2.0 / 3.0));
        assert_eq!(p.get(&[1, 3]), Some(1.0 / 3.0));
    }

    #[test]
    fn empty_file_has_insufficient_tokens() {
        assert_eq!(
            profile_file(Path::new("e.js"), &units(&[]), &table(), 4),
            Err(ExclusionReason::InsufficientTokens)
        );
    }

    #[test]
    fn unknown_label_is_reported() {
        assert_eq!(
            profile_file(Path::new("u.js"), &units(&["A", "Zzz"]), &table(), 1),
            Err(ExclusionReason::UnknownUnit("Zzz".into()))
        );
    }

    #[test]
    fn extraction_failure_passes_through() {
        let e = Fixed(Err(ExtractionFailure::PartiallyParseable));
        assert_eq!(
            profile_file(Path::new("m.js"), &e, &table(), 1),
            Err(ExclusionReason::Extraction(ExtractionFailure::PartiallyParseable))
        );
    }
}
