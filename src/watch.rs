//! # Watch Coordination
//!
//! In serve mode the host watches its docs directory and configuration file
//! to trigger rebuilds. After the session rewrites those into the workspace,
//! the host would be watching files that only change when the aggregator
//! itself rewrites them. [`coordinate`] points the watches back at the real
//! sources: the primary project's docs and config, and the docs directory of
//! every local repository. Remote repositories have nothing on disk to watch.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::{RepositoryDescriptor, DOCS_DIR};

/// The host's file watcher.
pub trait Watcher {
    /// Paths currently watched.
    fn watched_paths(&self) -> Vec<PathBuf>;

    /// Start watching `path`.
    fn watch(&mut self, path: PathBuf);

    /// Stop watching `path`.
    fn unwatch(&mut self, path: &Path);
}

/// A watcher that only records its paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchList {
    paths: BTreeSet<PathBuf>,
}

impl WatchList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Watcher for WatchList {
    fn watched_paths(&self) -> Vec<PathBuf> {
        self.paths.iter().cloned().collect()
    }

    fn watch(&mut self, path: PathBuf) {
        self.paths.insert(path);
    }

    fn unwatch(&mut self, path: &Path) {
        self.paths.remove(path);
    }
}

/// The paths serve mode should watch, in registration order.
pub fn watch_targets(
    primary_root: &Path,
    config_file: &Path,
    repos: &[RepositoryDescriptor],
) -> Vec<PathBuf> {
    let mut targets = vec![primary_root.join(DOCS_DIR), config_file.to_path_buf()];
    targets.extend(
        repos
            .iter()
            .filter(|repo| repo.is_local())
            .map(|repo| Path::new(&repo.location).join(DOCS_DIR)),
    );
    targets
}

/// Replace every watch of `watcher` with the real source locations.
pub fn coordinate(
    watcher: &mut dyn Watcher,
    primary_root: &Path,
    config_file: &Path,
    repos: &[RepositoryDescriptor],
) {
    for path in watcher.watched_paths() {
        watcher.unwatch(&path);
    }

    for path in watch_targets(primary_root, config_file, repos) {
        info!("Watching {}", path.display());
        watcher.watch(path);
    }
}
