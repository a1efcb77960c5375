//! Binary crate for the `locinfo` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and prompting for missing input
//! - Interactive configuration of API keys
//! - Printing the aggregated information as a table

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod table;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with the table on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
