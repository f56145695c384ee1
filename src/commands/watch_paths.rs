//! # Watch-Paths Command Implementation
//!
//! Prints the paths a serve session would watch for changes: the primary
//! project's docs directory, its configuration file, and the docs directory
//! of every local repository, one per line.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use docs_aggregator::config::DEFAULT_CONFIG_FILE;
use docs_aggregator::watch::watch_targets;

/// Show the paths watched in serve mode
#[derive(Args, Debug)]
pub struct WatchPathsArgs {
    /// Path to the site configuration file.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_FILE,
        env = "DOCS_AGGREGATOR_CONFIG"
    )]
    pub config: PathBuf,

    /// Root of the primary project (defaults to the config file's directory).
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Execute the `watch-paths` command.
pub fn execute(args: WatchPathsArgs) -> Result<()> {
    for path in targets(&args)? {
        println!("{}", path.display());
    }
    Ok(())
}

fn targets(args: &WatchPathsArgs) -> Result<Vec<PathBuf>> {
    let mut site = super::load_config(&args.config)?;
    let root = super::resolve_root(args.root.as_deref(), &args.config)?;
    site.aggregate.resolve_locations(&root);
    site.aggregate.validate()?;

    Ok(watch_targets(
        &root,
        &site.config_file_path,
        &site.aggregate.repos,
    ))
}
