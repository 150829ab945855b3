//! Console output for analysis, classification and validity checks.

use crate::analysis::{AnalysisSummary, Label};
use crate::cluster::Clustering;
use crate::extract::ExtractionFailure;
use crate::model::Score;
use colored::Colorize;
use std::path::Path;

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Prints the end-of-batch counts.
pub fn print_summary(summary: &AnalysisSummary) {
    let analyzed = format!(
        "{} {} analyzed",
        summary.analyzed,
        pluralize("file", summary.analyzed)
    );
    if summary.analyzed > 0 {
        println!("{} {analyzed}", "OK".green().bold());
    } else {
        println!("{} {analyzed}", "EMPTY".red().bold());
    }

    let excluded = summary.excluded_count();
    if excluded > 0 {
        println!(
            "{} {excluded} {} excluded",
            "WARN".yellow().bold(),
            pluralize("file", excluded)
        );
        for (kind, count) in summary.exclusions_by_kind() {
            println!("   {} {kind}: {count}", "-".blue());
        }
        for e in &summary.excluded {
            println!("   {} {} ({})", "-->".blue(), e.path.display(), e.reason.to_string().dimmed());
        }
    }

    if summary.new_ngrams > 0 {
        println!(
            "{} {} new {} indexed",
            "INFO".cyan(),
            summary.new_ngrams,
            pluralize("n-gram", summary.new_ngrams)
        );
    }
    if summary.dropped_ngrams > 0 {
        println!(
            "{} {} n-gram {} dropped: vector space exhausted",
            "WARN".yellow().bold(),
            summary.dropped_ngrams,
            pluralize("occurrence", summary.dropped_ngrams)
        );
    }
    if let Some(collisions) = summary.collisions {
        println!(
            "{} {collisions} hash {}",
            "INFO".cyan(),
            pluralize("collision", collisions)
        );
    }
}

/// `name: predicted (true)` lines.
pub fn print_predictions(names: &[String], predicted: &[Label], truth: &[Label], probas: &[f64]) {
    for (i, name) in names.iter().enumerate() {
        let predicted = predicted.get(i).copied().unwrap_or_default();
        let truth = truth.get(i).copied().unwrap_or_default();
        let shown = match predicted {
            Label::Malicious => predicted.as_str().red().bold(),
            Label::Benign => predicted.as_str().green(),
            Label::Unknown => predicted.as_str().normal(),
        };
        let proba = probas.get(i).copied().unwrap_or(f64::NAN);
        println!(
            "{name}: {shown} ({truth}) {}",
            format!("p(malicious) = {proba:.3}").dimmed()
        );
    }
    println!("{}", "> Name: labelPredicted (trueLabel)".dimmed());
}

pub fn print_score(score: &Score) {
    println!("{} {:.4}", "Detection:".bold(), score.detection);
    println!(
        "TP: {}, FP: {}, FN: {}, TN: {}",
        score.tp, score.fp, score.fn_, score.tn
    );
}

/// `name: cluster` lines, then the size of every cluster.
pub fn print_clusters(names: &[String], clustering: &Clustering, k: usize) {
    for (name, cluster) in names.iter().zip(&clustering.assignments) {
        println!("{name}: {}", cluster.to_string().cyan());
    }
    println!("{}", "> Name: cluster".dimmed());
    for (cluster, size) in clustering.sizes(k).iter().enumerate() {
        println!("   {} cluster {cluster}: {size} {}", "-".blue(), pluralize("file", *size));
    }
    println!("{} {:.4}", "Inertia:".bold(), clustering.inertia);
}

/// Total squared distance inside clusters for each k.
pub fn print_elbow(curve: &[(usize, f64)]) {
    println!("{}", "k  inertia".bold());
    for (k, inertia) in curve {
        println!("{k:<2} {inertia:.4}");
    }
}

/// One validity verdict per file.
pub fn print_check(path: &Path, outcome: &Result<Vec<String>, ExtractionFailure>) {
    match outcome {
        Ok(_) => println!("{}: {}", path.display(), "valid JavaScript".green()),
        Err(e @ ExtractionFailure::SystemError(_)) => {
            println!("{}: {}", path.display(), e.to_string().red());
        }
        Err(e) => println!("{}: {}", path.display(), e.to_string().yellow()),
    }
}

pub fn print_check_total(valid: usize, total: usize) {
    println!(
        "{} {valid} of {total} {} valid JavaScript",
        "OK".green().bold(),
        pluralize("file", total)
    );
}
