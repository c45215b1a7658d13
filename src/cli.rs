//! Command-line interface module for runany.
//!
//! This module handles:
//! - Argument parsing
//! - Configuration loading
//! - Building the dispatcher from configuration
//! - Launching a package or printing its launch plan

use crate::action_catalog::ActionCatalog;
use crate::config::LaunchConfig;
use crate::dispatcher::Dispatcher;
use crate::error::LaunchResult;
use crate::mime_sniffer::{MimeSniffer, build_sniffer};
use crate::output::OutputFormatter;
use crate::runner::SystemRunner;
use crate::strategy::CandidateAction;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Number of plan rows shown in a dry run.
const PLAN_ROWS: usize = 15;

/// Find the runnable thing inside a game or application package and run it.
#[derive(Debug, Parser)]
#[command(name = "runany", version, about)]
pub struct Args {
    /// Package directory (or single file) to launch.
    pub path: PathBuf,

    /// Show the ranked launch plan without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print the plan as JSON.
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Try the next-best candidate when the chosen one fails.
    #[arg(long)]
    pub fallthrough: bool,

    /// Configuration file (defaults to .runanyrc.toml, then ~/.config/runany/config.toml).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug diagnostics to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The command these arguments ask for.
    pub fn command(&self) -> LaunchCommand {
        if self.dry_run {
            LaunchCommand::Plan { json: self.json }
        } else {
            LaunchCommand::Run {
                fallthrough: self.fallthrough,
            }
        }
    }
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchCommand {
    /// Launch the package.
    Run {
        /// Force fall-through mode on, regardless of configuration.
        fallthrough: bool,
    },
    /// Print the ranked candidates without executing anything.
    Plan {
        /// Emit JSON instead of a table.
        json: bool,
    },
}

/// Runs the CLI application with the given command and package path.
///
/// # Examples
///
/// ```no_run
/// use runany::cli::{run_cli, LaunchCommand};
/// use std::path::Path;
///
/// let result = run_cli(LaunchCommand::Run { fallthrough: false }, Path::new("/games/pkg"));
/// if let Err(e) = result {
///     println!("Failed to run package: {}", e);
/// }
/// ```
pub fn run_cli(command: LaunchCommand, package_path: &Path) -> LaunchResult<()> {
    run_cli_with_config(command, package_path, None)
}

/// Runs the CLI application with an optional configuration file.
///
/// `package_path` is made absolute against the current directory first.
pub fn run_cli_with_config(
    command: LaunchCommand,
    package_path: &Path,
    config_path: Option<&Path>,
) -> LaunchResult<()> {
    let config = LaunchConfig::load(config_path)?;
    let root = absolute(package_path);

    let sniffer = build_sniffer(config.dispatch.sniffer, &config.programs.file);
    let catalog = ActionCatalog::from_config(sniffer, &config)?;
    let dispatcher = Dispatcher::from_config(catalog, SystemRunner, &config);

    match command {
        LaunchCommand::Run { fallthrough } => {
            let dispatcher = if fallthrough {
                dispatcher.with_fallthrough(true)
            } else {
                dispatcher
            };
            let attempted = dispatcher.run(&root)?;
            tracing::info!(levels = attempted.len(), "package dispatched");
            Ok(())
        }
        LaunchCommand::Plan { json } => print_plan(&dispatcher, &root, json),
    }
}

fn print_plan<S: MimeSniffer>(
    dispatcher: &Dispatcher<S, SystemRunner>,
    root: &Path,
    json: bool,
) -> LaunchResult<()> {
    let spinner = (!json).then(|| OutputFormatter::scan_spinner(root));
    let plan = dispatcher.plan(root);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let plan = plan?;

    if json {
        println!("{}", plan_json(&plan)?);
        return Ok(());
    }

    OutputFormatter::dry_run_notice(&format!("Analyzing package: {}", root.display()));
    OutputFormatter::plan_table(&plan, PLAN_ROWS);

    match plan.first() {
        Some(best) if best.strategy.is_extraction() => OutputFormatter::warning(&format!(
            "Would extract {} and decide again from its contents",
            best.path.display()
        )),
        Some(best) => OutputFormatter::success(&format!(
            "Would run {} ({})",
            best.path.display(),
            best.name()
        )),
        None => OutputFormatter::info("Nothing found to launch."),
    }
    Ok(())
}

/// Renders a plan as pretty-printed JSON.
///
/// Fails when a path is not valid UTF-8.
fn plan_json(plan: &[CandidateAction]) -> LaunchResult<String> {
    Ok(serde_json::to_string_pretty(plan)?)
}

/// Makes `path` absolute against the current directory, leaving it as is on failure.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
