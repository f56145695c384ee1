//! # Source Merging
//!
//! The merger rebuilds the workspace on every build pass:
//!
//! 1.  **Reset**: everything in the workspace except its `.git` directory is
//!     removed, so files deleted upstream do not linger between passes.
//!
//! 2.  **Primary copy**: the primary project is copied in, skipping hidden
//!     entries (`.git`, `.venv`, ...) at any depth.
//!
//! 3.  **Layering**: each repository is applied in declaration order. Local
//!     directories are copied include by include; remote repositories are
//!     registered as remotes of the workspace repository, fetched, and only
//!     their included paths are checked out. Later repositories overwrite
//!     earlier ones and the primary project.
//!
//! A failure in step 1 or 2 aborts the pass. A failure while layering one
//! repository is logged, recorded in the [`MergeReport`], and the merge moves
//! on to the next repository.
//!
//! Provenance is recorded afterwards by [`SourceMerger::record_provenance`],
//! which replays the same order over the sources that merged successfully.

use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{info, warn};
use serde::Serialize;

use crate::cache::{CacheKey, FetchCache};
use crate::config::{FetchPolicy, RepositoryDescriptor, DOCS_DIR};
use crate::error::{Error, Result};
use crate::filesystem::{
    clear_dir, copy_file, copy_tree, hidden_patterns, include_matches, is_glob, is_hidden_path,
    markdown_files, to_slash, GIT_DIR, INCLUDE_MATCH_OPTIONS,
};
use crate::provenance::{Origin, ProvenanceMap};
use crate::repository::{ensure_remote, DefaultGitOperations, GitOperations};

/// How one repository fared during a merge pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum RepoOutcome {
    Merged,
    Failed(String),
}

/// Per-repository entry of a [`MergeReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoReport {
    pub location: String,
    pub branch: String,
    pub local: bool,
    pub outcome: RepoOutcome,
}

/// Summary of one merge pass, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Files copied from the primary project.
    pub primary_files: usize,
    pub repos: Vec<RepoReport>,
}

impl MergeReport {
    pub fn failures(&self) -> impl Iterator<Item = &RepoReport> {
        self.repos
            .iter()
            .filter(|r| matches!(r.outcome, RepoOutcome::Failed(_)))
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Layers the primary project and the configured repositories into a workspace.
pub struct SourceMerger {
    git: Box<dyn GitOperations>,
    fetches: FetchCache,
}

impl SourceMerger {
    /// Creates a merger backed by the system `git` command.
    pub fn new(policy: FetchPolicy) -> Self {
        Self::with_git(Box::new(DefaultGitOperations), policy)
    }

    /// Creates a merger with a custom `GitOperations` implementation.
    pub fn with_git(git: Box<dyn GitOperations>, policy: FetchPolicy) -> Self {
        Self {
            git,
            fetches: FetchCache::new(policy),
        }
    }

    /// Change how often remote branches are fetched.
    pub fn set_fetch_policy(&mut self, policy: FetchPolicy) {
        self.fetches.set_policy(policy);
    }

    /// Rebuild `workspace` from `primary_root` and `repos`.
    pub fn merge(
        &mut self,
        workspace: &Path,
        primary_root: &Path,
        repos: &[RepositoryDescriptor],
    ) -> Result<MergeReport> {
        clear_dir(workspace, &[GIT_DIR])?;

        info!(
            "Copying {} into {}",
            primary_root.display(),
            workspace.display()
        );
        let primary_files = copy_tree(primary_root, workspace, &hidden_patterns()?)?;

        // The workspace repository is only needed to fetch remote content
        let init_error = if repos.iter().any(|r| !r.is_local()) {
            self.git.init(workspace).err().map(|e| e.to_string())
        } else {
            None
        };

        let mut report = MergeReport {
            primary_files,
            repos: Vec::with_capacity(repos.len()),
        };

        for repo in repos {
            let local = repo.is_local();
            let result = if local {
                merge_local(workspace, repo)
            } else if let Some(message) = &init_error {
                Err(Error::GitCommand {
                    command: "init".to_string(),
                    dir: workspace.display().to_string(),
                    stderr: message.clone(),
                })
            } else {
                self.merge_remote(workspace, repo)
            };

            let outcome = match result {
                Ok(()) => RepoOutcome::Merged,
                Err(e) => {
                    warn!("Skipping {}: {}", repo.location, e);
                    RepoOutcome::Failed(e.to_string())
                }
            };

            report.repos.push(RepoReport {
                location: repo.location.clone(),
                branch: repo.branch.clone(),
                local,
                outcome,
            });
        }

        Ok(report)
    }

    fn merge_remote(&mut self, workspace: &Path, repo: &RepositoryDescriptor) -> Result<()> {
        let name = ensure_remote(self.git.as_ref(), workspace, &repo.location)?;

        let key = CacheKey::new(&repo.location, &repo.branch);
        if self.fetches.needs_fetch(&key) {
            info!("Fetching {} ({})", repo.location, repo.branch);
            self.git
                .fetch(workspace, &name, &repo.location, &repo.branch)?;
            self.fetches.mark_fetched(key);
        } else {
            info!(
                "Reusing fetched {} ({})",
                repo.location, repo.branch
            );
        }

        if repo.includes.is_empty() {
            warn!("{} has no include entries, nothing to check out", repo.location);
            return Ok(());
        }

        self.git
            .checkout_paths(workspace, &name, &repo.branch, &repo.includes)
    }

    /// Record the origin of every page merged by the last pass.
    ///
    /// `primary` is the origin assigned to the primary project's pages.
    /// Repositories that failed in `report` contribute nothing. Returns the
    /// number of pages recorded.
    pub fn record_provenance(
        &self,
        provenance: &mut ProvenanceMap,
        workspace: &Path,
        primary_root: &Path,
        primary: &Origin,
        repos: &[RepositoryDescriptor],
        report: &MergeReport,
    ) -> Result<usize> {
        let mut recorded = provenance.record_origin(&primary_root.join(DOCS_DIR), primary)?;

        for (repo, outcome) in repos.iter().zip(&report.repos) {
            if outcome.outcome != RepoOutcome::Merged {
                continue;
            }

            let includes: Vec<&str> = repo.docs_includes().collect();
            if includes.is_empty() {
                continue;
            }

            if outcome.local {
                let origin = Origin::local(&repo.location, &repo.branch);
                let location = Path::new(&repo.location);
                for include in includes {
                    let files = local_files(location, include)?;
                    recorded += provenance.record_listing(files, &origin);
                }
            } else {
                let origin = Origin::remote(&repo.location, &repo.branch);
                let name = crate::git::remote_name(&repo.location);
                for include in includes {
                    match self.remote_listing(workspace, &name, &repo.branch, include) {
                        Ok(files) => recorded += provenance.record_listing(files, &origin),
                        Err(e) => warn!(
                            "Cannot list {} in {} ({}): {}",
                            include, repo.location, repo.branch, e
                        ),
                    }
                }
            }
        }

        Ok(recorded)
    }

    /// Files of `<name>/<branch>` selected by `include`.
    fn remote_listing(
        &self,
        workspace: &Path,
        name: &str,
        branch: &str,
        include: &str,
    ) -> Result<Vec<String>> {
        let files = self
            .git
            .list_files(workspace, name, branch, &literal_prefix(include))?;

        let mut selected = Vec::with_capacity(files.len());
        for file in files {
            if include_matches(include, &file)? {
                selected.push(file);
            }
        }
        Ok(selected)
    }
}

/// Leading directories of `include` that contain no glob metacharacters.
fn literal_prefix(include: &str) -> String {
    if !is_glob(include) {
        return include.to_string();
    }

    let literal: Vec<&str> = include
        .split('/')
        .take_while(|segment| !is_glob(segment))
        .collect();
    literal.join("/")
}

/// Copy the includes of a local repository into the workspace.
///
/// Hidden entries are never copied, whether matched directly or found below
/// an included directory.
fn merge_local(workspace: &Path, repo: &RepositoryDescriptor) -> Result<()> {
    let location = Path::new(&repo.location);
    if repo.includes.is_empty() {
        warn!("{} has no include entries, nothing to copy", repo.location);
        return Ok(());
    }

    let hidden = hidden_patterns()?;
    for include in &repo.includes {
        let matches = expand_include(location, include)?;
        if matches.is_empty() {
            warn!("{} matched nothing in {}", include, repo.location);
            continue;
        }

        for source in matches {
            let target = workspace.join(relative_to(&source, location)?);

            info!("Copying path {}", source.display());
            if source.is_dir() {
                copy_tree(&source, &target, &hidden)?;
            } else {
                copy_file(&source, &target)?;
            }
        }
    }

    Ok(())
}

/// Repository-relative paths of the files `include` copies from `location`.
fn local_files(location: &Path, include: &str) -> Result<Vec<String>> {
    let hidden = hidden_patterns()?;
    let mut files = Vec::new();
    for source in expand_include(location, include)? {
        let relative = relative_to(&source, location)?;
        if source.is_dir() {
            for file in markdown_files(&source, &hidden)? {
                files.push(to_slash(&relative.join(file)));
            }
        } else {
            files.push(to_slash(relative));
        }
    }
    Ok(files)
}

/// Paths under `location` selected by `include`, skipping hidden entries.
fn expand_include(location: &Path, include: &str) -> Result<Vec<PathBuf>> {
    let include = include.trim_end_matches('/');
    let hidden = hidden_patterns()?;

    let candidates = if is_glob(include) {
        let pattern = format!(
            "{}/{}",
            Pattern::escape(&location.to_string_lossy()),
            include
        );
        let mut matches = Vec::new();
        for entry in glob::glob_with(&pattern, INCLUDE_MATCH_OPTIONS)? {
            matches.push(entry.map_err(|e| Error::Filesystem {
                message: e.to_string(),
            })?);
        }
        matches
    } else {
        let path = location.join(include);
        if path.exists() {
            vec![path]
        } else {
            Vec::new()
        }
    };

    let mut selected = Vec::with_capacity(candidates.len());
    for path in candidates {
        if !is_hidden_path(relative_to(&path, location)?, &hidden) {
            selected.push(path);
        }
    }
    Ok(selected)
}

fn relative_to<'a>(path: &'a Path, base: &Path) -> Result<&'a Path> {
    path.strip_prefix(base).map_err(|e| Error::Filesystem {
        message: e.to_string(),
    })
}
