#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

use clap::Parser;
use hvcc::HvccConfig;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod commands;
mod error;

use cli::{CliArgs, Command};
use error::AppError;

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        error!(error = ?e, "Application failed");
        std::process::exit(1);
    }
}

fn bootstrap() -> Result<(), AppError> {
    let args = CliArgs::parse();

    let log_level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Initialization(e.to_string()))?;

    match args.command {
        Command::Build {
            input,
            output,
            complete,
            no_sei,
        } => {
            let config = HvccConfig::default()
                .with_array_completeness(complete)
                .with_include_sei(!no_sei);
            commands::build(&input, &output, &config)?;
        }
        Command::Annexb { input, output } => commands::annexb(&input, &output)?,
        Command::Split { input, output } => commands::split(&input, &output)?,
        Command::Inspect { input } => {
            commands::inspect(&input)?;
        }
    }

    Ok(())
}
