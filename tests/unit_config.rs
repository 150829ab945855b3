// tests/unit_config.rs
use jsgram_core::config::{Config, ExportFormat, UnknownUnitPolicy};
use jsgram_core::error::JsgramError;
use jsgram_core::index::Strategy;
use std::fs;

#[test]
fn test_from_path() {
    let d = tempfile::tempdir().unwrap();
    let p = d.path().join("jsgram.toml");
    fs::write(
        &p,
        "[parser]\nruntime = \"nodejs --stack-size=4000\"\ntolerant = true\n\n\
         [ngrams]\nn = 3\nstrategy = \"hash\"\nindex_dir = \"idx\"\n\n\
         [analysis]\nunknown_unit = \"abort\"\nparallel = false\n\n\
         [export]\nformat = \"tsv\"\n",
    )
    .unwrap();
    let c = Config::from_path(&p).unwrap();
    assert_eq!(c.parser.runtime, "nodejs --stack-size=4000");
    assert!(c.parser.tolerant);
    assert_eq!(c.ngrams.n, 3);
    assert_eq!(c.ngrams.strategy, Strategy::Hash);
    assert_eq!(c.ngrams.index_dir, std::path::PathBuf::from("idx"));
    assert_eq!(c.analysis.unknown_unit, UnknownUnitPolicy::Abort);
    assert!(!c.analysis.parallel);
    assert_eq!(c.export.format, ExportFormat::Tsv);
    assert_eq!(c.n_features(), 1000);
}

#[test]
fn test_missing_file_is_io_error() {
    let d = tempfile::tempdir().unwrap();
    let r = Config::from_path(&d.path().join("nope.toml"));
    assert!(matches!(r, Err(JsgramError::Io { .. })));
}

#[test]
fn test_bad_toml_is_config_error() {
    let d = tempfile::tempdir().unwrap();
    let p = d.path().join("jsgram.toml");
    fs::write(&p, "[ngrams\nn = ").unwrap();
    assert!(matches!(Config::from_path(&p), Err(JsgramError::Config(_))));
}

#[test]
fn test_unknown_strategy_is_rejected() {
    assert!(Config::parse_toml("[ngrams]\nstrategy = \"bloom\"\n").is_err());
}

#[test]
fn test_zero_timeout_is_rejected() {
    assert!(Config::parse_toml("[parser]\ntimeout_secs = 0\n").is_err());
}

#[test]
fn test_zero_size_is_rejected() {
    assert!(Config::parse_toml("[features]\nsizes = [19, 0]\n").is_err());
}

#[test]
fn test_custom_unit_table() {
    let d = tempfile::tempdir().unwrap();
    let table = d.path().join("tokens.json");
    fs::write(&table, r#"{ "name": "my-tokens", "units": { "Keyword": 0, "Punctuator": 1 } }"#)
        .unwrap();
    let toml = format!("[parser]\ntable_path = {:?}\n", table.display().to_string());
    let c = Config::parse_toml(&toml).unwrap();
    let t = c.unit_table().unwrap();
    assert_eq!(t.name(), "my-tokens");
    assert_eq!(t.code("Punctuator"), Some(1));
}

#[test]
fn test_unknown_builtin_table() {
    let c = Config::parse_toml("[parser]\ntable = \"slimit\"\n").unwrap();
    assert!(c.unit_table().is_err());
}
