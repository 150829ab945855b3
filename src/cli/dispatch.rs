//! Command dispatch logic extracted from the binary.

use super::args::Commands;
use super::handlers::{self, Session};
use crate::config::Config;
use crate::exit::JsgramExit;
use anyhow::{Context, Result};
use std::path::Path;

/// Loads configuration and executes the parsed command.
///
/// # Errors
/// Returns error if the configuration is invalid or the command handler fails.
pub fn execute(command: Commands, config_path: Option<&Path>) -> Result<JsgramExit> {
    let config = match config_path {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::load().context("Failed to load jsgram.toml")?,
    };
    let session = Session::new(config);

    match command {
        Commands::Analyze {
            corpus,
            out,
            format,
        } => handlers::handle_analyze(session, &corpus, &out, format),
        Commands::UpdateIndex { corpus } => handlers::handle_update_index(session, &corpus),
        Commands::Train { corpus, model } => handlers::handle_train(session, &corpus, &model),
        Commands::UpdateModel { corpus, model } => {
            handlers::handle_update_model(session, &corpus, &model)
        }
        Commands::Classify {
            corpus,
            model,
            threshold,
        } => handlers::handle_classify(session, &corpus, &model, threshold),
        Commands::Cluster {
            corpus,
            clusters,
            elbow,
        } => handlers::handle_cluster(session, &corpus, clusters, elbow),
        Commands::Check {
            files,
            dirs,
            tolerant,
        } => handlers::handle_check(session, &files, &dirs, tolerant),
    }
}
