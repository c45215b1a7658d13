use clap::Parser;
use runany::cli::{Args, run_cli_with_config};
use runany::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    match run_cli_with_config(args.command(), &args.path, args.config.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::failure(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
