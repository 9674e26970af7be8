//! codemap - Snapshot a codebase into a single annotated text map
//!
//! codemap provides:
//! - Recursive scanning of one or more source folders
//! - Include/exclude rules for folders and files, with built-in skips for dependency caches
//! - Text files embedded with content, other files listed as path markers
//! - Named configurations saved under codemap/config

use anyhow::Result;
use clap::Parser;

mod backends;
mod cli;
mod core;

fn init_tracing(verbose: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            tracing_subscriber::EnvFilter::new("debug")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);
    cli::run(cli)
}
