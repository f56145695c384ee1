//! # Provenance Tracking
//!
//! Every markdown page in the merged docs tree came from somewhere: the
//! primary project, a local sibling directory, or a branch of a remote
//! repository. The [`ProvenanceMap`] records that origin per page, keyed by
//! the page's path relative to the docs root (always with forward slashes),
//! so the edit-URL resolver can later point readers at the right upstream
//! file.
//!
//! The map follows the merge order: when two sources provide the same page,
//! the one recorded last wins, exactly as its content won in the workspace.
//! It is cleared at the start of every build pass.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use serde::Serialize;
use url::Url;

use crate::config::DOCS_DIR;
use crate::error::Result;
use crate::filesystem::{hidden_patterns, is_markdown, markdown_files, to_slash};

/// Whether an origin can be edited through a hosted repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    /// A directory on this machine.
    Local,
    /// A remote git repository.
    Remote,
}

/// Where a page came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub location: String,
    pub branch: String,
    pub kind: OriginKind,
}

impl Origin {
    pub fn local(location: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            branch: branch.into(),
            kind: OriginKind::Local,
        }
    }

    pub fn remote(location: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            branch: branch.into(),
            kind: OriginKind::Remote,
        }
    }

    /// Build an origin, deciding its kind from the location string alone.
    ///
    /// URLs with a non-`file` scheme and scp-like `user@host:path` locations
    /// are remote; anything else is treated as a local path.
    pub fn classify(location: impl Into<String>, branch: impl Into<String>) -> Self {
        let location = location.into();
        let kind = if looks_remote(&location) {
            OriginKind::Remote
        } else {
            OriginKind::Local
        };
        Self {
            location,
            branch: branch.into(),
            kind,
        }
    }

    pub fn is_local(&self) -> bool {
        self.kind == OriginKind::Local
    }
}

fn looks_remote(location: &str) -> bool {
    match Url::parse(location) {
        // Single-letter schemes are Windows drive letters
        Ok(url) => url.scheme() != "file" && url.scheme().len() > 1,
        Err(_) => {
            let Some((user_host, path)) = location.split_once(':') else {
                return false;
            };
            user_host.contains('@') && !user_host.contains('/') && !path.is_empty()
        }
    }
}

/// Origin of every page of the merged docs tree, keyed by relative path.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ProvenanceMap {
    entries: BTreeMap<String, Origin>,
}

impl ProvenanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `origin` for `path`, replacing any earlier origin.
    pub fn insert(&mut self, path: impl Into<String>, origin: Origin) {
        self.entries.insert(normalize(&path.into()), origin);
    }

    /// Look up the origin of a page.
    pub fn get(&self, path: &str) -> Option<&Origin> {
        self.entries.get(&normalize(path))
    }

    /// Drop every entry; called at the start of each build pass.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Origin)> {
        self.entries.iter()
    }

    /// Record every markdown file under `docs_root` as coming from `origin`.
    ///
    /// Hidden entries are skipped. A missing `docs_root` records nothing.
    /// Returns the number of recorded pages.
    pub fn record_origin(&mut self, docs_root: &Path, origin: &Origin) -> Result<usize> {
        let mut recorded = 0;
        for file in markdown_files(docs_root, &hidden_patterns()?)? {
            self.entries.insert(to_slash(&file), origin.clone());
            recorded += 1;
        }

        debug!(
            "Recorded {} pages from {} ({}) under {}",
            recorded,
            origin.location,
            origin.branch,
            docs_root.display()
        );
        Ok(recorded)
    }

    /// Record pages from a repository file listing.
    ///
    /// `files` are repository-relative paths; only markdown files below
    /// `docs/` are kept, with that prefix stripped.
    pub fn record_listing<I>(&mut self, files: I, origin: &Origin) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let prefix = format!("{}/", DOCS_DIR);
        let mut recorded = 0;
        for file in files {
            let Some(relative) = file.strip_prefix(&prefix) else {
                continue;
            };
            if relative.is_empty() || !is_markdown(Path::new(relative)) {
                continue;
            }
            self.entries.insert(relative.to_string(), origin.clone());
            recorded += 1;
        }

        debug!(
            "Recorded {} pages from listing of {} ({})",
            recorded, origin.location, origin.branch
        );
        recorded
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# page").unwrap();
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            Origin::classify("https://github.com/org/repo.git", "main").kind,
            OriginKind::Remote
        );
        assert_eq!(
            Origin::classify("git@github.com:org/repo.git", "main").kind,
            OriginKind::Remote
        );
        assert_eq!(
            Origin::classify("ssh://git@example.com/repo", "main").kind,
            OriginKind::Remote
        );
        assert_eq!(
            Origin::classify("/local/path", "master").kind,
            OriginKind::Local
        );
        assert_eq!(
            Origin::classify("../sibling", "master").kind,
            OriginKind::Local
        );
        assert_eq!(
            Origin::classify("file:///srv/repo.git", "master").kind,
            OriginKind::Local
        );
        assert_eq!(
            Origin::classify("C:\\docs\\repo", "master").kind,
            OriginKind::Local
        );
    }

    #[test]
    fn test_record_origin_relative_paths() {
        let temp = TempDir::new().unwrap();
        let docs = temp.path().join("docs");
        write(&docs, "index.md");
        write(&docs, "admin/users.md");
        write(&docs, "admin/logo.png");
        write(&docs, ".drafts/wip.md");

        let mut map = ProvenanceMap::new();
        let origin = Origin::remote("https://example.com/primary.git", "main");
        let count = map.record_origin(&docs, &origin).unwrap();

        assert_eq!(count, 2);
        assert_eq!(map.get("index.md"), Some(&origin));
        assert_eq!(map.get("admin/users.md"), Some(&origin));
        assert!(map.get("admin/logo.png").is_none());
        assert!(map.get(".drafts/wip.md").is_none());
    }

    #[test]
    fn test_record_origin_missing_root() {
        let mut map = ProvenanceMap::new();
        let count = map
            .record_origin(Path::new("/nonexistent/docs"), &Origin::local("/x", "master"))
            .unwrap();
        assert_eq!(count, 0);
        assert!(map.is_empty());
    }

    #[test]
    fn test_last_writer_wins() {
        let temp = TempDir::new().unwrap();
        let docs = temp.path().join("docs");
        write(&docs, "shared.md");

        let mut map = ProvenanceMap::new();
        let first = Origin::local("/first", "master");
        let second = Origin::remote("https://example.com/second.git", "dev");
        map.record_origin(&docs, &first).unwrap();
        map.record_origin(&docs, &second).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("shared.md"), Some(&second));
    }

    #[test]
    fn test_record_listing_strips_docs_prefix() {
        let mut map = ProvenanceMap::new();
        let origin = Origin::remote("https://example.com/ext.git", "main");
        let files = vec![
            "docs/admin/foo.md".to_string(),
            "docs/admin/diagram.svg".to_string(),
            "README.md".to_string(),
            "docsite/index.md".to_string(),
        ];

        let count = map.record_listing(files, &origin);

        assert_eq!(count, 1);
        assert_eq!(map.get("admin/foo.md"), Some(&origin));
        assert!(map.get("README.md").is_none());
    }

    #[test]
    fn test_lookup_normalizes_separators() {
        let mut map = ProvenanceMap::new();
        map.insert("admin/foo.md", Origin::local("/x", "master"));
        assert!(map.get("admin\\foo.md").is_some());
        assert!(map.get("./admin/foo.md").is_some());
    }

    #[test]
    fn test_clear() {
        let mut map = ProvenanceMap::new();
        map.insert("a.md", Origin::local("/x", "master"));
        map.clear();
        assert!(map.is_empty());
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut map = ProvenanceMap::new();
        map.insert("z.md", Origin::local("/x", "master"));
        map.insert("a/b.md", Origin::local("/x", "master"));
        let keys: Vec<&String> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a/b.md", "z.md"]);
    }
}
