//! # Remote Repository Access
//!
//! The merger never calls `git` directly. It goes through the
//! [`GitOperations`] trait, which describes the handful of version-control
//! actions aggregation needs: initializing the workspace repository,
//! registering remotes, fetching a branch, listing files at a ref and checking
//! out selected paths.
//!
//! [`DefaultGitOperations`] forwards to the system `git` binary (see
//! [`crate::git`]). Tests substitute a mock that writes files into the
//! workspace directly, so the merge and provenance rules can be exercised
//! without a network or a git installation.

use crate::error::Result;
use std::path::Path;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Initializes `dir` as a repository. Must be idempotent.
    fn init(&self, dir: &Path) -> Result<()>;

    /// Lists the remotes registered in `dir`.
    fn remotes(&self, dir: &Path) -> Result<Vec<String>>;

    /// Registers `url` under the remote `name`.
    fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<()>;

    /// Fetches `branch` from the remote `name` (whose URL is `url`).
    fn fetch(&self, dir: &Path, name: &str, url: &str, branch: &str) -> Result<()>;

    /// Checks out `paths` from `<name>/<branch>` into the working tree.
    fn checkout_paths(&self, dir: &Path, name: &str, branch: &str, paths: &[String])
    -> Result<()>;

    /// Lists the files under `path` at `<name>/<branch>`, recursively, as
    /// repository-relative paths.
    fn list_files(&self, dir: &Path, name: &str, branch: &str, path: &str) -> Result<Vec<String>>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn init(&self, dir: &Path) -> Result<()> {
        crate::git::init(dir)
    }

    fn remotes(&self, dir: &Path) -> Result<Vec<String>> {
        crate::git::remotes(dir)
    }

    fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<()> {
        crate::git::add_remote(dir, name, url)
    }

    fn fetch(&self, dir: &Path, name: &str, url: &str, branch: &str) -> Result<()> {
        crate::git::fetch(dir, name, url, branch)
    }

    fn checkout_paths(
        &self,
        dir: &Path,
        name: &str,
        branch: &str,
        paths: &[String],
    ) -> Result<()> {
        crate::git::checkout_paths(dir, name, branch, paths)
    }

    fn list_files(&self, dir: &Path, name: &str, branch: &str, path: &str) -> Result<Vec<String>> {
        crate::git::list_files(dir, name, branch, path)
    }
}

/// Ensure `url` is registered as a remote of `dir`, returning its name.
pub fn ensure_remote(git: &dyn GitOperations, dir: &Path, url: &str) -> Result<String> {
    let name = crate::git::remote_name(url);
    if !git.remotes(dir)?.iter().any(|r| *r == name) {
        git.add_remote(dir, &name, url)?;
    }
    Ok(name)
}
