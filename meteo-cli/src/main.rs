//! Binary crate for the `meteo` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive search and configuration
//! - Human-friendly output formatting

use clap::Parser;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output for `meteo` with `-v`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "warn,meteo_core=debug,meteo=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}
