//! # CLI Command Implementations
//!
//! Each subcommand of `docs-aggregator` lives in its own file with:
//! - An `Args` struct that defines the command-specific options, derived
//!   using `clap`.
//! - An `execute` function that takes the parsed `Args` and drives the
//!   `docs_aggregator` library.
//!
//! The helpers below are shared by every command that reads a site
//! configuration.

pub mod build;
pub mod validate;
pub mod watch_paths;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use docs_aggregator::config::{self, SiteConfig};

/// Error for a missing configuration file, with hints on how to point at one.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Run the command from the directory holding mkdocs.yml\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set the DOCS_AGGREGATOR_CONFIG environment variable",
        path = path.display()
    )
}

/// Load the site configuration at `path`.
///
/// The recorded config path is made absolute so it stays valid whatever the
/// primary root turns out to be.
pub fn load_config(path: &Path) -> Result<SiteConfig> {
    if !path.exists() {
        return Err(config_not_found(path));
    }

    let mut site = config::from_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    site.config_file_path = std::path::absolute(path)?;
    Ok(site)
}

/// The primary project's root: `--root` if given, else the config's directory.
pub fn resolve_root(root: Option<&Path>, config_path: &Path) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    };
    Ok(std::path::absolute(root)?)
}
