//! # Docs Aggregator CLI
//!
//! This is the binary entry point for the `docs-aggregator` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging.
//! - Executing the appropriate command based on the parsed arguments.
//!
//! The aggregation logic lives in the `lib.rs` library crate; the binary plays
//! the part of a host build tool driving one session.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
