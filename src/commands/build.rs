//! # Build Command Implementation
//!
//! Runs one aggregation pass the way a host build would: configure, merge,
//! and shut the session down again.
//!
//! ## Functionality
//!
//! - **Aggregation**: merges the primary project and every configured
//!   repository into a temporary workspace.
//! - **Export**: with `--output`, copies the merged docs tree somewhere
//!   permanent before the workspace is removed.
//! - **Sources**: with `--sources`, prints the origin and edit URL of every
//!   tracked page, as text or JSON.
//!
//! Repositories that fail to merge are reported but do not fail the command;
//! only configuration errors and failures to build the primary tree do.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, ValueEnum};
use log::warn;
use serde::Serialize;

use docs_aggregator::config::{SiteConfig, DEFAULT_CONFIG_FILE};
use docs_aggregator::edit_url;
use docs_aggregator::filesystem::copy_tree;
use docs_aggregator::merger::MergeReport;
use docs_aggregator::output::{emoji, merge_summary, OutputConfig};
use docs_aggregator::provenance::{OriginKind, ProvenanceMap};
use docs_aggregator::session::Session;

/// Aggregate the configured repositories once
#[derive(Args, Debug)]
pub struct BuildArgs {
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

    /// Copy the merged docs tree into this directory.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Print the origin and edit URL of every tracked page.
    #[arg(long)]
    pub sources: bool,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only print what was explicitly asked for.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format options for the build report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// A tracked page and where to edit it.
#[derive(Debug, Serialize)]
struct SourceEntry<'a> {
    page: &'a str,
    location: &'a str,
    branch: &'a str,
    kind: OriginKind,
    edit_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    report: &'a MergeReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sources: Option<Vec<SourceEntry<'a>>>,
}

/// Execute the `build` command.
///
/// The session is shut down whatever the outcome of the pass; a teardown
/// failure is logged and does not change the exit status.
pub fn execute(args: BuildArgs, out: &OutputConfig) -> Result<()> {
    let mut site = super::load_config(&args.config)?;
    let root = super::resolve_root(args.root.as_deref(), &args.config)?;

    let mut session = Session::new(&root)?;
    let result = run(&args, out, &mut session, &mut site);

    if let Err(e) = session.on_shutdown() {
        warn!("Failed to clean up: {}", e);
    }
    result
}

fn run(
    args: &BuildArgs,
    out: &OutputConfig,
    session: &mut Session,
    site: &mut SiteConfig,
) -> Result<()> {
    let text = args.format == OutputFormat::Text;

    session.on_config(site)?;
    let report = session.on_pre_build()?;
    if !report.is_complete() {
        warn!(
            "{} of {} repositories failed to merge",
            report.failures().count(),
            report.repos.len()
        );
    }

    if text && !args.quiet {
        println!("{}", merge_summary(out, &report));
    }

    if let Some(output) = &args.output {
        let copied = copy_tree(&session.workspace().docs_dir(), output, &[])?;
        if text && !args.quiet {
            println!(
                "{} Wrote {} file(s) to {}",
                emoji(out, "📁", "[WRITE]"),
                copied,
                output.display()
            );
        }
    }

    let sources = args.sources.then(|| source_entries(session.provenance()));
    match args.format {
        OutputFormat::Json => {
            let json = JsonReport {
                report: &report,
                output: args.output.as_deref(),
                sources,
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if let Some(sources) = sources {
                print_sources(&sources);
            }
        }
    }
    Ok(())
}

fn source_entries(provenance: &ProvenanceMap) -> Vec<SourceEntry<'_>> {
    provenance
        .iter()
        .map(|(page, origin)| SourceEntry {
            page,
            location: &origin.location,
            branch: &origin.branch,
            kind: origin.kind,
            edit_url: edit_url::edit_url_for(origin, page),
        })
        .collect()
}

fn print_sources(sources: &[SourceEntry<'_>]) {
    let width = sources.iter().map(|s| s.page.len()).max().unwrap_or(0);
    for source in sources {
        println!(
            "{:width$}  {}@{}  {}",
            source.page,
            source.location,
            source.branch,
            source.edit_url.as_deref().unwrap_or("-"),
            width = width
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docs_aggregator::provenance::Origin;
    use std::fs;
    use tempfile::TempDir;

    fn args(config: PathBuf) -> BuildArgs {
        BuildArgs {
            config,
            root: None,
            output: None,
            sources: false,
            format: OutputFormat::Text,
            quiet: true,
        }
    }

    fn primary_project() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("docs/guide")).unwrap();
        fs::write(temp.path().join("docs/index.md"), "# Home\n").unwrap();
        fs::write(temp.path().join("docs/guide/start.md"), "# Start\n").unwrap();
        temp
    }

    #[test]
    fn test_execute_missing_config() {
        let result = execute(
            args(PathBuf::from("/nonexistent/mkdocs.yml")),
            &OutputConfig::without_color(),
        );
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Configuration file not found")
        );
    }

    #[test]
    fn test_execute_writes_output() {
        let primary = primary_project();
        let extra = TempDir::new().unwrap();
        fs::create_dir_all(extra.path().join("docs/admin")).unwrap();
        fs::write(extra.path().join("docs/admin/foo.md"), "# Admin\n").unwrap();

        let config_path = primary.path().join("mkdocs.yml");
        fs::write(
            &config_path,
            format!(
                "site_name: Test\naggregate:\n  repos:\n    - url: {}\n      include: [docs/admin]\n",
                extra.path().display()
            ),
        )
        .unwrap();

        let output = TempDir::new().unwrap();
        let mut build = args(config_path);
        build.output = Some(output.path().join("site-docs"));
        build.sources = true;

        execute(build, &OutputConfig::without_color()).unwrap();

        let site_docs = output.path().join("site-docs");
        assert_eq!(
            fs::read_to_string(site_docs.join("index.md")).unwrap(),
            "# Home\n"
        );
        assert!(site_docs.join("guide/start.md").exists());
        assert_eq!(
            fs::read_to_string(site_docs.join("admin/foo.md")).unwrap(),
            "# Admin\n"
        );
    }

    #[test]
    fn test_execute_rejects_invalid_repo() {
        let primary = primary_project();
        let config_path = primary.path().join("mkdocs.yml");
        fs::write(
            &config_path,
            "aggregate:\n  repos:\n    - url: \"\"\n      include: [docs]\n",
        )
        .unwrap();

        let output = TempDir::new().unwrap();
        let mut build = args(config_path);
        build.output = Some(output.path().join("out"));

        assert!(execute(build, &OutputConfig::without_color()).is_err());
        assert!(!output.path().join("out").exists());
    }

    #[test]
    fn test_execute_json_format() {
        let primary = primary_project();
        let config_path = primary.path().join("mkdocs.yml");
        fs::write(&config_path, "site_name: Test\n").unwrap();

        let mut build = args(config_path);
        build.format = OutputFormat::Json;
        build.sources = true;
        build.quiet = false;

        assert!(execute(build, &OutputConfig::without_color()).is_ok());
    }

    #[test]
    fn test_source_entries_edit_urls() {
        let mut provenance = ProvenanceMap::new();
        provenance.insert(
            "admin/foo.md",
            Origin::remote("https://example.com/repo.git", "main"),
        );
        provenance.insert("index.md", Origin::local("/local/path", "master"));

        let entries = source_entries(&provenance);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].page, "admin/foo.md");
        assert_eq!(
            entries[0].edit_url.as_deref(),
            Some("https://example.com/repo/edit/main/docs/admin/foo.md")
        );
        assert_eq!(entries[1].page, "index.md");
        assert_eq!(entries[1].edit_url, None);
    }

    #[test]
    fn test_json_report_shape() {
        let report = MergeReport {
            primary_files: 2,
            repos: Vec::new(),
        };
        let json = serde_json::to_value(JsonReport {
            report: &report,
            output: None,
            sources: Some(Vec::new()),
        })
        .unwrap();

        assert_eq!(json["report"]["primary_files"], 2);
        assert!(json["sources"].as_array().unwrap().is_empty());
        assert!(json.get("output").is_none());
    }
}
