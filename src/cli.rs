//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use docs_aggregator::output::OutputConfig;

use crate::commands;

/// Docs Aggregator - Merge documentation from several repositories into one site
#[derive(Parser, Debug)]
#[command(name = "docs-aggregator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate the configured repositories into a workspace once
    Build(commands::build::BuildArgs),

    /// Validate the aggregation settings of a site configuration
    Validate(commands::validate::ValidateArgs),

    /// Show the paths watched in serve mode
    WatchPaths(commands::watch_paths::WatchPathsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Build(args) => commands::build::execute(args, &output),
            Commands::Validate(args) => commands::validate::execute(args, &output),
            Commands::WatchPaths(args) => commands::watch_paths::execute(args),
        }
    }
}

/// Route `log` records to stderr; `RUST_LOG` overrides `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when running inside tests
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
