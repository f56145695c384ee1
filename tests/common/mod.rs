//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_page("index.md", "# Home");
//!     fixture.command().arg("build").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git_available, GitRepo, TestFixture};
}

/// A primary project in a temporary directory, with an `mkdocs.yml`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a project with an empty config file.
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        fixture.with_config("site_name: Test\n")
    }

    /// Replace `mkdocs.yml` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("mkdocs.yml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a page under the project's `docs/` directory.
    pub fn with_page(self, path: &str, content: &str) -> Self {
        self.with_file(&format!("docs/{path}"), content)
    }

    /// Add a file anywhere in the project.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("mkdocs.yml")
    }

    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command running in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docs-aggregator");
        cmd.current_dir(self.path())
            .env_remove("DOCS_AGGREGATOR_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a `git` binary is on the PATH.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

/// A real git repository with one commit per [`GitRepo::commit`] call.
#[allow(dead_code)]
pub struct GitRepo {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl GitRepo {
    /// Initialize a repository whose default branch is `branch`.
    pub fn new(branch: &str) -> Self {
        let repo = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        repo.git(&["init", "--quiet"]);
        repo.git(&["checkout", "--quiet", "-b", branch]);
        repo.git(&["config", "user.email", "docs@example.com"]);
        repo.git(&["config", "user.name", "Docs Test"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Stage everything and commit.
    pub fn commit(self, message: &str) -> Self {
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "-m", message]);
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A `file://` URL, which git treats as a remote.
    pub fn url(&self) -> String {
        format!("file://{}", self.path().display())
    }

    fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_config() {
        let fixture = TestFixture::new();
        assert!(fixture.config_path().exists());
    }

    #[test]
    fn test_fixture_with_page() {
        let fixture = TestFixture::new().with_page("guide/start.md", "# Start");
        assert!(fixture.path().join("docs/guide/start.md").exists());
    }
}
