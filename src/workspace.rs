//! # Workspace Management
//!
//! The workspace is the temporary directory the host builds from. It holds
//! the merged documentation tree, the copied site configuration and, once a
//! remote repository has been configured, the git metadata used to fetch and
//! check out remote content.
//!
//! A workspace lives as long as its session. Its contents are rebuilt on
//! every pass, but the directory itself and its `.git` metadata survive
//! until [`Workspace::destroy`] so that remote objects fetched during one
//! build are still available on the next rebuild of a serve session.

use std::path::{Path, PathBuf};

use log::info;
use tempfile::TempDir;

use crate::config::DOCS_DIR;
use crate::error::{Error, Result};

/// Prefix of every workspace directory name.
const WORKSPACE_PREFIX: &str = "docs-aggregate-";

/// A uniquely named temporary directory owned by one session.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Workspace {
    /// Allocate a fresh workspace under the system temporary directory.
    pub fn create() -> Result<Self> {
        Self::create_in(std::env::temp_dir())
    }

    /// Allocate a fresh workspace under `parent`.
    pub fn create_in<P: AsRef<Path>>(parent: P) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)?;
        let path = dir.path().to_path_buf();
        info!("Created workspace {}", path.display());
        Ok(Self {
            path,
            dir: Some(dir),
        })
    }

    /// Root of the workspace.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Documentation root inside the workspace.
    pub fn docs_dir(&self) -> PathBuf {
        self.path.join(DOCS_DIR)
    }

    /// Location of the copied site configuration file.
    pub fn config_path(&self, file_name: &Path) -> PathBuf {
        self.path.join(file_name)
    }

    /// Recursively remove the workspace.
    ///
    /// Calling this more than once is a no-op.
    pub fn destroy(&mut self) -> Result<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };

        info!("Removing workspace {}", self.path.display());
        dir.close().map_err(|e| Error::Teardown {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }
}
