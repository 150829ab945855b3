// src/cli/handlers.rs
use crate::analysis::{expand_inputs, Analysis, Analyzer};
use crate::cli::args::CorpusArgs;
use crate::config::{Config, ExportFormat};
use crate::exit::JsgramExit;
use crate::export;
use crate::extract::{ExternalParser, UnitExtractor};
use crate::index::{store, FeatureIndex, Strategy};
use crate::cluster;
use crate::model::{self, Classifier, FeatureSpace, ForestSettings, RandomForest};
use crate::reporting;
use anyhow::{Context, Result};
use colored::Colorize;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use std::path::{Path, PathBuf};

/// Configuration for one command invocation.
pub struct Session {
    config: Config,
}

impl Session {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration with corpus flags applied on top.
    ///
    /// # Errors
    /// Returns error if the result is not a valid configuration.
    pub fn configure(self, corpus: &CorpusArgs) -> Result<Config> {
        let mut config = self.config;
        if let Some(n) = corpus.n {
            config.ngrams.n = n;
        }
        if let Some(strategy) = corpus.strategy {
            config.ngrams.strategy = strategy;
        }
        if corpus.tolerant {
            config.parser.tolerant = true;
        }
        if let Some(policy) = corpus.unknown_unit {
            config.analysis.unknown_unit = policy;
        }
        if corpus.sequential {
            config.analysis.parallel = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn no_inputs() -> JsgramExit {
    eprintln!(
        "{} indicate a directory (--dir) or a JavaScript file (--file) to be studied",
        "Error:".red()
    );
    JsgramExit::InvalidInput
}

/// Runs the analysis over the corpus and prints the summary.
fn run_corpus(config: &Config, corpus: &CorpusArgs) -> Result<Analysis> {
    let queue = expand_inputs(
        &corpus.dirs,
        &corpus.dir_labels,
        &corpus.files,
        &corpus.file_labels,
    )?;
    let table = config.unit_table()?;
    let parser = ExternalParser::from_config(&config.parser)?;
    let mut index = FeatureIndex::open(
        config.ngrams.strategy,
        &config.ngrams.index_dir,
        table.name(),
        config.ngrams.n,
        config.n_features(),
    )
    .context("Failed to open the n-gram index")?;

    let analyzer = Analyzer::new(parser, table, config.ngrams.n)?
        .with_policy(config.analysis.unknown_unit)
        .with_parallel(config.analysis.parallel);
    let analysis = analyzer.analyze(&queue, &mut index)?;

    reporting::print_summary(&analysis.summary);
    Ok(analysis)
}

fn feature_space(config: &Config, analysis: &Analysis) -> Result<FeatureSpace> {
    Ok(FeatureSpace {
        table: config.unit_table()?.name().to_string(),
        n: config.ngrams.n,
        strategy: config.ngrams.strategy,
        n_features: analysis.matrix.n_cols(),
    })
}

/// Handles the analyze command.
///
/// # Errors
/// Returns error if the analysis or the export fails.
pub fn handle_analyze(
    session: Session,
    corpus: &CorpusArgs,
    out: &Path,
    format: Option<ExportFormat>,
) -> Result<JsgramExit> {
    if corpus.is_empty() {
        return Ok(no_inputs());
    }
    let config = session.configure(corpus)?;
    let analysis = run_corpus(&config, corpus)?;
    if analysis.summary.analyzed == 0 {
        return Ok(JsgramExit::NothingAnalyzed);
    }

    let format = format.unwrap_or(config.export.format);
    let path = export::output_path(out, format);
    export::export_analysis(&analysis, &path, format)?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(JsgramExit::Success)
}

/// Handles the update-index command.
///
/// # Errors
/// Returns error if the analysis or persisting the index fails.
pub fn handle_update_index(session: Session, corpus: &CorpusArgs) -> Result<JsgramExit> {
    if corpus.is_empty() {
        return Ok(no_inputs());
    }
    if corpus.strategy == Some(Strategy::Hash) {
        eprintln!("{} the hash strategy has no index to update", "Error:".red());
        return Ok(JsgramExit::InvalidInput);
    }
    let mut config = session.configure(corpus)?;
    config.ngrams.strategy = Strategy::Dictionary;

    let analysis = run_corpus(&config, corpus)?;
    let path = store::index_path(
        &config.ngrams.index_dir,
        config.unit_table()?.name(),
        config.ngrams.n,
    );
    println!("{} {}", "Index".green(), path.display());
    if analysis.summary.analyzed == 0 {
        return Ok(JsgramExit::NothingAnalyzed);
    }
    Ok(JsgramExit::Success)
}

/// Handles the train command.
///
/// # Errors
/// Returns error if the analysis, the training or saving the model fails.
pub fn handle_train(session: Session, corpus: &CorpusArgs, model_path: &Path) -> Result<JsgramExit> {
    if corpus.is_empty() {
        return Ok(no_inputs());
    }
    let config = session.configure(corpus)?;
    let analysis = run_corpus(&config, corpus)?;
    if analysis.summary.analyzed == 0 {
        return Ok(JsgramExit::NothingAnalyzed);
    }

    let mut model = RandomForest::new(
        feature_space(&config, &analysis)?,
        ForestSettings::from(&config.model),
    );
    model.train(&analysis.matrix, &analysis.labels)?;
    model
        .save(model_path)
        .with_context(|| format!("Failed to save model to {}", model_path.display()))?;
    println!("{} {}", "Saved model".green(), model_path.display());
    Ok(JsgramExit::Success)
}

/// Handles the update-model command.
///
/// # Errors
/// Returns error if the model cannot be loaded, does not match, or cannot be saved.
pub fn handle_update_model(
    session: Session,
    corpus: &CorpusArgs,
    model_path: &Path,
) -> Result<JsgramExit> {
    if corpus.is_empty() {
        return Ok(no_inputs());
    }
    let config = session.configure(corpus)?;
    let mut model = RandomForest::load(model_path)
        .with_context(|| format!("Failed to load model {}", model_path.display()))?
        .with_add_trees(config.model.add_trees);
    let analysis = run_corpus(&config, corpus)?;
    if analysis.summary.analyzed == 0 {
        return Ok(JsgramExit::NothingAnalyzed);
    }

    model.space().ensure_matches(&feature_space(&config, &analysis)?)?;
    model.update(&analysis.matrix, &analysis.labels)?;
    model.save(model_path)?;
    println!("{} {}", "Updated model".green(), model_path.display());
    Ok(JsgramExit::Success)
}

/// Handles the classify command.
///
/// # Errors
/// Returns error if the model cannot be loaded or does not match the corpus.
pub fn handle_classify(
    session: Session,
    corpus: &CorpusArgs,
    model_path: &Path,
    threshold: Option<f64>,
) -> Result<JsgramExit> {
    if corpus.is_empty() {
        return Ok(no_inputs());
    }
    let config = session.configure(corpus)?;
    let threshold = threshold.unwrap_or(config.model.threshold);
    if !(0.0..=1.0).contains(&threshold) {
        eprintln!("{} threshold {threshold} is outside [0, 1]", "Error:".red());
        return Ok(JsgramExit::InvalidInput);
    }
    let model = RandomForest::load(model_path)
        .with_context(|| format!("Failed to load model {}", model_path.display()))?;
    let analysis = run_corpus(&config, corpus)?;
    if analysis.summary.analyzed == 0 {
        return Ok(JsgramExit::NothingAnalyzed);
    }

    model.space().ensure_matches(&feature_space(&config, &analysis)?)?;
    let probas = model.predict_proba(&analysis.matrix)?;
    let predicted = model::predict_with_threshold(&probas, threshold);
    reporting::print_predictions(&analysis.file_names, &predicted, &analysis.labels, &probas);
    if let Some(score) = model::score(&analysis.labels, &predicted) {
        reporting::print_score(&score);
    }
    Ok(JsgramExit::Success)
}

/// Handles the cluster command.
///
/// # Errors
/// Returns error if the analysis or a k-means run fails.
pub fn handle_cluster(
    session: Session,
    corpus: &CorpusArgs,
    clusters: usize,
    elbow: Option<usize>,
) -> Result<JsgramExit> {
    if corpus.is_empty() {
        return Ok(no_inputs());
    }
    let config = session.configure(corpus)?;
    if clusters == 0 {
        eprintln!("{} indicate at least one cluster", "Error:".red());
        return Ok(JsgramExit::InvalidInput);
    }
    let analysis = run_corpus(&config, corpus)?;
    if analysis.summary.analyzed == 0 {
        return Ok(JsgramExit::NothingAnalyzed);
    }
    if clusters > analysis.summary.analyzed {
        eprintln!(
            "{} cannot form {clusters} clusters from {} files",
            "Error:".red(),
            analysis.summary.analyzed
        );
        return Ok(JsgramExit::InvalidInput);
    }

    if let Some(max_k) = elbow {
        let curve = cluster::elbow(&analysis.matrix, max_k, &config.cluster)?;
        reporting::print_elbow(&curve);
    }
    let clustering = cluster::cluster(&analysis.matrix, clusters, &config.cluster)?;
    reporting::print_clusters(&analysis.file_names, &clustering, clusters);
    Ok(JsgramExit::Success)
}

/// Handles the check command.
///
/// # Errors
/// Returns error if a directory cannot be listed or the parser is misconfigured.
pub fn handle_check(
    session: Session,
    files: &[PathBuf],
    dirs: &[PathBuf],
    tolerant: bool,
) -> Result<JsgramExit> {
    if files.is_empty() && dirs.is_empty() {
        return Ok(no_inputs());
    }
    let config = session.config;
    let parser =
        ExternalParser::from_config(&config.parser)?.with_tolerance(tolerant || config.parser.tolerant);
    let queue = expand_inputs(dirs, &[], files, &[])?;

    let outcomes: Vec<_> = queue
        .par_iter()
        .map(|input| parser.extract(&input.path))
        .collect();

    let mut valid = 0;
    for (input, outcome) in queue.iter().zip(&outcomes) {
        reporting::print_check(&input.path, outcome);
        if outcome.is_ok() {
            valid += 1;
        }
    }
    reporting::print_check_total(valid, queue.len());
    Ok(JsgramExit::Success)
}
