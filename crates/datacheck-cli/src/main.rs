//! # datacheck CLI entry point
//!
//! Parses command-line arguments, sets up tracing, and runs one
//! verification of the repository's data tree.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use datacheck_cli::verify::{run_verify, VerifyArgs};

/// Validate a repository's data tree.
///
/// Checks every `data/**/*.json` document against the schema named by its
/// `$schema` field, requires `0x...` directories to be checksummed
/// addresses, and requires every entry to have a CODEOWNERS owner.
#[derive(Parser, Debug)]
#[command(name = "datacheck", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    verify: VerifyArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(args = ?cli.verify, "datacheck starting");

    match run_verify(&cli.verify) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
