//! # Validate Command Implementation
//!
//! Checks the `aggregate` section of a site configuration without touching
//! any repository: the file must parse, and every repository must declare a
//! location. Branches set on local directories are reported as warnings.
//!
//! This command is a read-only operation that does not modify any files.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use docs_aggregator::config::{RepositoryDescriptor, DEFAULT_CONFIG_FILE};
use docs_aggregator::output::{emoji, OutputConfig};

/// Validate the aggregation settings of a site configuration
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the site configuration file to validate.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_FILE,
        env = "DOCS_AGGREGATOR_CONFIG"
    )]
    pub config: PathBuf,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, out: &OutputConfig) -> Result<()> {
    let config_path = &args.config;
    println!(
        "{} Validating configuration: {}",
        emoji(out, "🔍", "[SCAN]"),
        config_path.display()
    );

    let site = match super::load_config(config_path) {
        Ok(site) => {
            println!(
                "{} Configuration file parsed successfully",
                emoji(out, "✅", "[OK]")
            );
            site
        }
        Err(e) => {
            println!(
                "{} Configuration parsing failed",
                emoji(out, "❌", "[ERR]")
            );
            return Err(e);
        }
    };

    let mut options = site.aggregate;
    options.resolve_locations(&super::resolve_root(None, config_path)?);
    if let Err(e) = options.validate() {
        println!(
            "{} Repository validation failed: {}",
            emoji(out, "❌", "[ERR]"),
            e
        );
        return Err(e.into());
    }

    println!(
        "{} {} repositor{} configured (fetch: {:?})",
        emoji(out, "📦", "[REPOS]"),
        options.repos.len(),
        if options.repos.len() == 1 { "y" } else { "ies" },
        options.fetch
    );
    for (index, repo) in options.repos.iter().enumerate() {
        println!("  {}. {}", index + 1, describe(repo));
    }

    println!("{} Configuration is valid", emoji(out, "✅", "[OK]"));
    Ok(())
}

fn describe(repo: &RepositoryDescriptor) -> String {
    let includes = if repo.includes.is_empty() {
        "nothing".to_string()
    } else {
        repo.includes.join(", ")
    };
    if repo.is_local() {
        format!("{} (local) includes {}", repo.location, includes)
    } else {
        format!(
            "{} (remote, {}) includes {}",
            repo.location, repo.branch, includes
        )
    }
}
