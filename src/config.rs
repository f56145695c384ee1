//! # Configuration Schema and Parsing
//!
//! This module defines the data structures read from the host's site
//! configuration file (`mkdocs.yml` by default) and the validation applied to
//! them before any build starts.
//!
//! ## Key Components
//!
//! - **`SiteConfig`**: the host's mutable site configuration. The session
//!   rewrites `docs_dir` and `config_file_path` so the host builds from the
//!   workspace instead of the primary project.
//!
//! - **`AggregateOptions`**: the options under the `aggregate` key, holding the
//!   ordered list of repositories and the fetch policy.
//!
//! - **`RepositoryDescriptor`**: one declared documentation source, either a
//!   local directory or a remote git URL.
//!
//! ## Example
//!
//! ```yaml
//! site_name: Combined docs
//! primary_branch: main
//! aggregate:
//!   fetch: always
//!   repos:
//!     - url: https://github.com/example/extension.git
//!       branch: main
//!       include: ["docs/extension"]
//!     - url: ../sibling-project
//!       include: ["docs"]
//! ```

use crate::error::{Error, Result};
use crate::provenance::Origin;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Branch assumed for a repository when none is configured.
pub const DEFAULT_BRANCH: &str = "master";

/// Name of the documentation directory inside every repository.
pub const DOCS_DIR: &str = "docs";

/// Default site configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "mkdocs.yml";

/// Get the default branch of a repository descriptor
///
/// # Examples
///
/// ```
/// use docs_aggregator::config::default_branch;
///
/// assert_eq!(default_branch(), "master");
/// ```
pub fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from(DOCS_DIR)
}

fn default_primary_branch() -> String {
    "main".to_string()
}

/// A user-declared documentation source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// The repository URL to fetch from, or the local path to copy from.
    #[serde(rename = "url", default)]
    pub location: String,
    /// The branch to fetch. Ignored for local directories.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Paths or globs within the repository to merge into the workspace.
    #[serde(rename = "include", default)]
    pub includes: Vec<String>,
}

impl RepositoryDescriptor {
    /// Create a descriptor on the default branch.
    pub fn new(location: impl Into<String>, includes: &[&str]) -> Self {
        Self {
            location: location.into(),
            branch: default_branch(),
            includes: includes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Builder-style setter for the branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Whether the location resolves to an existing local directory.
    pub fn is_local(&self) -> bool {
        Path::new(&self.location).is_dir()
    }

    /// Anchor a relative directory path at `base`.
    ///
    /// Remote locations, absolute paths, and relative paths that name no
    /// directory below `base` are left untouched.
    pub fn resolve_against(&mut self, base: &Path) {
        let location = Path::new(&self.location);
        if self.location.trim().is_empty()
            || location.is_absolute()
            || !Origin::classify(self.location.as_str(), self.branch.as_str()).is_local()
        {
            return;
        }

        let anchored = base.join(location);
        if anchored.is_dir() {
            debug!("Resolved {} to {}", self.location, anchored.display());
            self.location = anchored.to_string_lossy().into_owned();
        }
    }

    /// Validates the descriptor.
    ///
    /// Fails when no location is declared. A branch set on a local directory
    /// only produces a warning, since directories have no branch to select.
    pub fn validate(&self) -> Result<()> {
        if self.location.trim().is_empty() {
            return Err(Error::Configuration {
                message: "repo does not define a url or a path".to_string(),
                hint: Some("Add 'url:' with a git URL or a local directory".to_string()),
            });
        }

        if self.is_local() && self.branch != DEFAULT_BRANCH {
            warn!(
                "{} is a path, ignoring branch option {}",
                self.location, self.branch
            );
        }

        Ok(())
    }

    /// The includes that select content under the `docs` directory.
    pub fn docs_includes(&self) -> impl Iterator<Item = &str> {
        self.includes
            .iter()
            .map(|s| s.trim_end_matches('/'))
            .filter(|s| *s == DOCS_DIR || s.starts_with("docs/"))
    }
}

/// How often remote branches are fetched during a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPolicy {
    /// Fetch on every build pass.
    #[default]
    Always,
    /// Fetch each remote branch once, then reuse it for later rebuilds.
    Once,
}

/// Options under the `aggregate` key of the site configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOptions {
    /// Repositories merged on top of the primary project, in order.
    #[serde(default)]
    pub repos: Vec<RepositoryDescriptor>,
    /// Fetch policy for remote repositories.
    #[serde(default)]
    pub fetch: FetchPolicy,
}

impl AggregateOptions {
    /// Anchor every relative directory location at `base`, normally the
    /// primary project's root.
    pub fn resolve_locations(&mut self, base: &Path) {
        for repo in &mut self.repos {
            repo.resolve_against(base);
        }
    }

    /// Validates every repository, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        for (index, repo) in self.repos.iter().enumerate() {
            repo.validate().map_err(|e| {
                warn!("misconfigured repo #{}: {:?}", index + 1, repo);
                e
            })?;
        }
        Ok(())
    }
}

/// The host's site configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site_name: Option<String>,
    /// Directory the host renders markdown from.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
    /// Branch the primary project's pages are edited on.
    #[serde(default = "default_primary_branch")]
    pub primary_branch: String,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub edit_uri: Option<String>,
    #[serde(default)]
    pub aggregate: AggregateOptions,
    /// Path of the configuration file, set by the loader.
    #[serde(skip)]
    pub config_file_path: PathBuf,
    /// Keys owned by the host and passed through untouched.
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: None,
            docs_dir: default_docs_dir(),
            primary_branch: default_primary_branch(),
            repo_url: None,
            edit_uri: None,
            aggregate: AggregateOptions::default(),
            config_file_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            extra: serde_yaml::Mapping::new(),
        }
    }
}

/// Parses a YAML string into a `SiteConfig`.
///
/// An empty document yields the default configuration. The descriptors are
/// not validated here; see [`AggregateOptions::validate`].
pub fn parse(yaml_content: &str) -> Result<SiteConfig> {
    if yaml_content.trim().is_empty() {
        return Ok(SiteConfig::default());
    }

    let config: SiteConfig = serde_yaml::from_str(yaml_content).map_err(|e| {
        Error::Configuration {
            message: e.to_string(),
            hint: Some("Each entry of 'aggregate.repos' needs a 'url'".to_string()),
        }
    })?;
    Ok(config)
}

/// Reads and parses a site configuration file.
pub fn from_file(path: &Path) -> Result<SiteConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Configuration {
        message: format!("Failed to read {}: {}", path.display(), e),
        hint: None,
    })?;
    let mut config = parse(&content)?;
    config.config_file_path = path.to_path_buf();
    Ok(config)
}
