// tests/integration_analyze.rs
//! Corpus analysis against an in-process extractor.

use jsgram_core::analysis::{Analyzer, ExclusionReason, Label, LabeledPath};
use jsgram_core::cluster;
use jsgram_core::config::{ClusterConfig, UnknownUnitPolicy};
use jsgram_core::error::JsgramError;
use jsgram_core::extract::{ExtractionFailure, UnitExtractor};
use jsgram_core::index::store::index_path;
use jsgram_core::index::{DictionaryIndex, FeatureIndex, HashingIndex, Strategy};
use jsgram_core::model::{self, Classifier, FeatureSpace, ForestSettings, RandomForest};
use jsgram_core::units::UnitTable;
use jsgram_core::vector::FeatureMatrix;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Serves canned parser results keyed by path.
#[derive(Default)]
struct FakeParser {
    outputs: HashMap<PathBuf, Result<Vec<String>, ExtractionFailure>>,
}

impl FakeParser {
    fn units(mut self, path: &str, labels: &[&str]) -> Self {
        self.outputs.insert(
            PathBuf::from(path),
            Ok(labels.iter().map(|s| (*s).to_string()).collect()),
        );
        self
    }

    fn failing(mut self, path: &str, failure: ExtractionFailure) -> Self {
        self.outputs.insert(PathBuf::from(path), Err(failure));
        self
    }
}

impl UnitExtractor for FakeParser {
    fn extract(&self, path: &Path) -> Result<Vec<String>, ExtractionFailure> {
        self.outputs
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(ExtractionFailure::SystemError("no such file".into())))
    }
}

fn table() -> UnitTable {
    let codes: HashMap<String, u32> = [("A", 3), ("B", 1), ("C", 2), ("D", 4)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    UnitTable::new("fake", codes)
}

fn queue(paths: &[&str]) -> Vec<LabeledPath> {
    paths.iter().map(|p| LabeledPath::unlabeled(*p)).collect()
}

fn dictionary(capacity: usize) -> FeatureIndex {
    FeatureIndex::Dictionary(DictionaryIndex::new("fake", 2, capacity))
}

fn dense_rows(matrix: &FeatureMatrix) -> Vec<Vec<f64>> {
    (0..matrix.n_rows()).filter_map(|i| matrix.dense_row(i)).collect()
}

#[test]
fn failed_file_is_excluded_and_order_is_kept() {
    let parser = FakeParser::default()
        .units("a.js", &["A", "B", "A"])
        .failing("b.js", ExtractionFailure::NotParseable)
        .units("c.js", &["C", "D"]);
    let analyzer = Analyzer::new(parser, table(), 2).unwrap();
    let mut index = dictionary(10);

    let result = analyzer.analyze(&queue(&["a.js", "b.js", "c.js"]), &mut index).unwrap();

    assert_eq!(result.file_names, vec!["a.js", "c.js"]);
    assert_eq!(result.matrix.n_rows(), 2);
    assert_eq!(result.labels.len(), 2);
    assert_eq!(result.summary.analyzed, 2);
    assert_eq!(result.summary.excluded_count(), 1);
    assert_eq!(result.summary.excluded[0].path, PathBuf::from("b.js"));
    assert_eq!(
        result.summary.excluded[0].reason,
        ExclusionReason::Extraction(ExtractionFailure::NotParseable)
    );
}

#[test]
fn order_is_kept_when_sequential() {
    let parser = FakeParser::default()
        .units("z.js", &["A", "B"])
        .units("a.js", &["C", "D"]);
    let analyzer = Analyzer::new(parser, table(), 2).unwrap().with_parallel(false);
    let result = analyzer.analyze(&queue(&["z.js", "a.js"]), &mut dictionary(10)).unwrap();
    assert_eq!(result.file_names, vec!["z.js", "a.js"]);
}

#[test]
fn small_corpus_bigram_vector() {
    let parser = FakeParser::default().units("file1.js", &["A", "B", "A", "B"]);
    let analyzer = Analyzer::new(parser, table(), 2).unwrap();
    let mut index = dictionary(10);

    let result = analyzer.analyze(&queue(&["file1.js"]), &mut index).unwrap();
    let rows = dense_rows(&result.matrix);

    assert_eq!(rows[0].len(), 10);
    assert!((rows[0][0] - 2.0 / 3.0).abs() < 1e-9);
    assert!((rows[0][1] - 1.0 / 3.0).abs() < 1e-9);
    assert!(rows[0][2..].iter().all(|v| *v == 0.0));

    let FeatureIndex::Dictionary(dict) = &index else {
        panic!("expected a dictionary index");
    };
    assert_eq!(dict.lookup(&[3, 1]), Some(0));
    assert_eq!(dict.lookup(&[1, 3]), Some(1));
    assert_eq!(result.summary.new_ngrams, 2);
}

#[test]
fn empty_file_is_excluded_for_insufficient_tokens() {
    let parser = FakeParser::default().units("empty.js", &[]);
    let analyzer = Analyzer::new(parser, table(), 4).unwrap();
    let mut index = FeatureIndex::Dictionary(DictionaryIndex::new("fake", 4, 10));

    let result = analyzer.analyze(&queue(&["empty.js"]), &mut index).unwrap();

    assert!(result.file_names.is_empty());
    assert_eq!(result.matrix.n_rows(), 0);
    assert_eq!(result.summary.excluded[0].reason, ExclusionReason::InsufficientTokens);
    assert_eq!(result.summary.excluded[0].reason.to_string(), "insufficient tokens");
}

#[test]
fn capacity_exhaustion_drops_mass_without_failing() {
    let parser = FakeParser::default()
        .units("one.js", &["B", "C"])
        .units("two.js", &["A", "D"]);
    let analyzer = Analyzer::new(parser, table(), 2).unwrap();
    let mut index = dictionary(1);

    let result = analyzer.analyze(&queue(&["one.js", "two.js"]), &mut index).unwrap();
    let rows = dense_rows(&result.matrix);

    assert_eq!(rows[0], vec![1.0]);
    assert!(rows[1].iter().sum::<f64>() < 1.0);
    assert_eq!(result.summary.dropped_ngrams, 1);
    assert_eq!(result.summary.analyzed, 2);
}

#[test]
fn unknown_unit_is_skipped_by_default() {
    let parser = FakeParser::default()
        .units("ok.js", &["A", "B"])
        .units("odd.js", &["A", "Mystery"]);
    let analyzer = Analyzer::new(parser, table(), 2).unwrap();

    let result = analyzer.analyze(&queue(&["ok.js", "odd.js"]), &mut dictionary(10)).unwrap();

    assert_eq!(result.file_names, vec!["ok.js"]);
    assert_eq!(
        result.summary.excluded[0].reason,
        ExclusionReason::UnknownUnit("Mystery".into())
    );
}

#[test]
fn unknown_unit_aborts_before_touching_the_index() {
    let tmp = tempfile::tempdir().unwrap();
    let parser = FakeParser::default()
        .units("ok.js", &["A", "B"])
        .units("odd.js", &["Mystery"]);
    let analyzer = Analyzer::new(parser, table(), 2)
        .unwrap()
        .with_policy(UnknownUnitPolicy::Abort);
    let mut index = FeatureIndex::open(Strategy::Dictionary, tmp.path(), "fake", 2, 10).unwrap();

    let err = analyzer
        .analyze(&queue(&["ok.js", "odd.js"]), &mut index)
        .unwrap_err();

    assert!(matches!(err, JsgramError::UnknownUnit { ref label, .. } if label == "Mystery"));
    let FeatureIndex::Dictionary(dict) = &index else {
        panic!("expected a dictionary index");
    };
    assert!(dict.is_empty());
    assert!(!index_path(tmp.path(), "fake", 2).exists());
}

#[test]
fn dictionary_is_persisted_once_and_reused() {
    let tmp = tempfile::tempdir().unwrap();
    let path = index_path(tmp.path(), "fake", 2);
    let parser = FakeParser::default()
        .units("a.js", &["A", "B", "C"])
        .units("b.js", &["C", "D", "A"]);
    let analyzer = Analyzer::new(parser, table(), 2).unwrap();

    let mut first = FeatureIndex::open(Strategy::Dictionary, tmp.path(), "fake", 2, 10).unwrap();
    let run1 = analyzer.analyze(&queue(&["a.js"]), &mut first).unwrap();
    let saved = fs::read_to_string(&path).unwrap();

    let mut second = FeatureIndex::open(Strategy::Dictionary, tmp.path(), "fake", 2, 10).unwrap();
    let run2 = analyzer.analyze(&queue(&["a.js"]), &mut second).unwrap();

    assert_eq!(dense_rows(&run1.matrix), dense_rows(&run2.matrix));
    assert_eq!(run2.summary.new_ngrams, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), saved);

    let mut third = FeatureIndex::open(Strategy::Dictionary, tmp.path(), "fake", 2, 10).unwrap();
    let run3 = analyzer.analyze(&queue(&["b.js", "a.js"]), &mut third).unwrap();
    assert_eq!(dense_rows(&run3.matrix)[1], dense_rows(&run1.matrix)[0]);
}

#[test]
fn mismatched_index_is_refused() {
    let analyzer = Analyzer::new(FakeParser::default(), table(), 3).unwrap();
    let err = analyzer.analyze(&queue(&[]), &mut dictionary(10)).unwrap_err();
    assert!(matches!(err, JsgramError::IndexMismatch { .. }));
}

#[test]
fn hash_mode_stacks_rows_in_order() {
    let parser = FakeParser::default()
        .units("a.js", &["A", "B", "A", "B"])
        .failing("bad.js", ExtractionFailure::PartiallyParseable)
        .units("c.js", &["C", "D", "C"]);
    let analyzer = Analyzer::new(parser, table(), 2).unwrap();
    let mut index = FeatureIndex::Hashing(HashingIndex::new(361));

    let result = analyzer
        .analyze(&queue(&["a.js", "bad.js", "c.js"]), &mut index)
        .unwrap();

    assert_eq!(result.file_names, vec!["a.js", "c.js"]);
    assert_eq!(result.matrix.n_cols(), 361);
    for row in dense_rows(&result.matrix) {
        assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
    assert!(result.summary.collisions.is_some());
    assert_eq!(result.summary.dropped_ngrams, 0);
}

#[test]
fn labels_follow_their_files() {
    let parser = FakeParser::default()
        .units("good.js", &["A", "B"])
        .failing("gone.js", ExtractionFailure::NotParseable)
        .units("evil.js", &["C", "D"]);
    let analyzer = Analyzer::new(parser, table(), 2).unwrap();
    let inputs = vec![
        LabeledPath::new("good.js", Label::Benign),
        LabeledPath::new("gone.js", Label::Malicious),
        LabeledPath::new("evil.js", Label::Malicious),
    ];

    let result = analyzer.analyze(&inputs, &mut dictionary(10)).unwrap();

    assert_eq!(result.labels, vec![Label::Benign, Label::Malicious]);
}

#[test]
fn train_then_classify() {
    let parser = FakeParser::default()
        .units("b1.js", &["A", "B", "A", "B"])
        .units("b2.js", &["B", "A", "B", "A"])
        .units("m1.js", &["C", "D", "C", "D"])
        .units("m2.js", &["D", "C", "D", "C"])
        .units("unknown.js", &["C", "D", "C", "D", "C"]);
    let analyzer = Analyzer::new(parser, table(), 2).unwrap();
    let mut index = dictionary(20);

    let training = analyzer
        .analyze(
            &[
                LabeledPath::new("b1.js", Label::Benign),
                LabeledPath::new("b2.js", Label::Benign),
                LabeledPath::new("m1.js", Label::Malicious),
                LabeledPath::new("m2.js", Label::Malicious),
            ],
            &mut index,
        )
        .unwrap();
    let space = FeatureSpace {
        table: "fake".into(),
        n: 2,
        strategy: Strategy::Dictionary,
        n_features: training.matrix.n_cols(),
    };
    let settings = ForestSettings {
        estimators: 25,
        add_trees: 5,
        max_depth: 10,
        seed: 0,
    };
    let mut classifier = RandomForest::new(space, settings);
    classifier.train(&training.matrix, &training.labels).unwrap();

    let test = analyzer.analyze(&queue(&["unknown.js"]), &mut index).unwrap();
    let probas = classifier.predict_proba(&test.matrix).unwrap();
    let predicted = model::predict_with_threshold(&probas, 0.29);

    assert_eq!(predicted, vec![Label::Malicious]);
    assert!(model::score(&test.labels, &predicted).is_none());

    let self_check = classifier.predict_proba(&training.matrix).unwrap();
    let score = model::score(
        &training.labels,
        &model::predict_with_threshold(&self_check, 0.5),
    )
    .unwrap();
    assert_eq!((score.tp, score.tn), (2, 2));
}

#[test]
fn corpus_falls_into_families() {
    let parser = FakeParser::default()
        .units("a1.js", &["A", "B", "A", "B"])
        .units("a2.js", &["B", "A", "B", "A"])
        .units("c1.js", &["C", "D", "C", "D"])
        .units("c2.js", &["D", "C", "D", "C", "D"]);
    let analyzer = Analyzer::new(parser, table(), 2).unwrap();
    let result = analyzer
        .analyze(&queue(&["a1.js", "c1.js", "a2.js", "c2.js"]), &mut dictionary(16))
        .unwrap();

    let config = ClusterConfig {
        max_iter: 100,
        restarts: 4,
        seed: 1,
    };
    let families = cluster::cluster(&result.matrix, 2, &config).unwrap();
    let a = &families.assignments;

    assert_eq!(a.len(), result.file_names.len());
    assert_eq!(a[0], a[2]);
    assert_eq!(a[1], a[3]);
    assert_ne!(a[0], a[1]);
}
