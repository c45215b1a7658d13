//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: decision lines,
//! colored status messages, the scan spinner, and launch plan tables.

use crate::strategy::CandidateAction;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints the decision line for a candidate about to be attempted.
    ///
    /// The line is always `<score>: <strategy>: <path>`, uncolored, on
    /// stdout, so wrappers can parse it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use runany::output::OutputFormatter;
    /// use runany::strategy::{CandidateAction, Strategy};
    /// use std::path::PathBuf;
    ///
    /// let candidate = CandidateAction::new(Strategy::Java, 30, PathBuf::from("/pkg/game.jar"), 0);
    /// OutputFormatter::decision(&candidate); // prints "30: java: /pkg/game.jar"
    /// ```
    pub fn decision(candidate: &CandidateAction) {
        println!("{}", candidate);
    }

    /// Prints the top-level failure line.
    pub fn failure(message: &str) {
        println!("Failed to run package: {}", message);
    }

    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a spinner shown on stderr while a tree is being scanned.
    ///
    /// Hidden automatically when stderr is not a terminal.
    pub fn scan_spinner(root: &Path) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        spinner.set_message(format!("Scanning {}", root.display()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    /// Prints a ranked launch plan as a table, best candidate first.
    ///
    /// Only the first `limit` rows are shown; the rest are summarized.
    pub fn plan_table(plan: &[CandidateAction], limit: usize) {
        Self::header("LAUNCH PLAN");

        let rows: Vec<_> = plan.iter().take(limit).collect();

        let max_score_len = rows
            .iter()
            .map(|c| c.score.to_string().len())
            .max()
            .unwrap_or(0)
            .max(5); // At least "Score" width
        let max_name_len = rows
            .iter()
            .map(|c| c.name().len())
            .max()
            .unwrap_or(0)
            .max(8); // At least "Strategy" width

        println!(
            "{:>score_w$} | {:<name_w$} | {}",
            "Score".bold(),
            "Strategy".bold(),
            "Path".bold(),
            score_w = max_score_len,
            name_w = max_name_len
        );
        println!("{}", "-".repeat(max_score_len + max_name_len + 12));

        for (i, candidate) in rows.iter().enumerate() {
            let name = if candidate.strategy.is_extraction() {
                candidate.name().yellow()
            } else if i == 0 {
                candidate.name().green().bold()
            } else {
                candidate.name().normal()
            };
            println!(
                "{:>score_w$} | {:<name_w$} | {}",
                candidate.score,
                name,
                candidate.path.display(),
                score_w = max_score_len,
                name_w = max_name_len
            );
        }

        if plan.len() > rows.len() {
            let hidden = plan.len() - rows.len();
            println!(
                "{}",
                format!(
                    "... {} more {}",
                    hidden,
                    if hidden == 1 { "entry" } else { "entries" }
                )
                .dimmed()
            );
        }
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
