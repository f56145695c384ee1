//! # Build Session
//!
//! A [`Session`] is the object the host build tool talks to. It owns the
//! workspace, the provenance map and the merger, and exposes one method per
//! host lifecycle hook:
//!
//! ```text
//!            on_config            on_pre_build           on_serve
//!   Idle ─────────────▶ Configured ────────────▶ Merged ──────────▶ Serving
//!                           ▲                      │                 │  ▲
//!                           └──── on_config ───────┘                 └──┘
//!                                                           on_config / on_pre_build
//!
//!   any state ── on_shutdown ──▶ ShutDown
//! ```
//!
//! Hooks called in any other order fail with [`Error::InvalidTransition`].
//! The provenance map is cleared at the start of every `on_pre_build`, so
//! the edit URLs handed out after a pass only ever reflect that pass.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::config::{AggregateOptions, FetchPolicy, SiteConfig, DEFAULT_CONFIG_FILE, DOCS_DIR};
use crate::edit_url;
use crate::error::{Error, Result};
use crate::merger::{MergeReport, SourceMerger};
use crate::provenance::{Origin, ProvenanceMap};
use crate::watch::{self, Watcher};
use crate::workspace::Workspace;

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Configured,
    Merged,
    Serving,
    ShutDown,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The host's per-page context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Path of the page relative to the docs root.
    pub src_path: String,
    pub edit_url: Option<String>,
}

impl Page {
    pub fn new(src_path: impl Into<String>) -> Self {
        Self {
            src_path: src_path.into(),
            edit_url: None,
        }
    }
}

/// Aggregation state shared by every hook of one host session.
pub struct Session {
    state: SessionState,
    primary_root: PathBuf,
    workspace: Workspace,
    merger: SourceMerger,
    provenance: ProvenanceMap,
    options: AggregateOptions,
    /// The primary project's own config file, watched in serve mode.
    primary_config_file: PathBuf,
    primary_origin: Origin,
}

impl Session {
    /// Start a session for the project rooted at `primary_root`.
    ///
    /// The workspace is created immediately and lives until
    /// [`Session::on_shutdown`].
    pub fn new(primary_root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_merger(primary_root, SourceMerger::new(FetchPolicy::default()))
    }

    /// Start a session with a custom merger (used to inject git mocks).
    pub fn with_merger(primary_root: impl Into<PathBuf>, merger: SourceMerger) -> Result<Self> {
        let primary_root = primary_root.into();
        let workspace = Workspace::create()?;
        Ok(Self {
            state: SessionState::Idle,
            primary_origin: Origin::local(primary_root.to_string_lossy(), "main"),
            primary_config_file: primary_root.join(DEFAULT_CONFIG_FILE),
            primary_root,
            workspace,
            merger,
            provenance: ProvenanceMap::new(),
            options: AggregateOptions::default(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn primary_root(&self) -> &Path {
        &self.primary_root
    }

    /// Provenance recorded by the last build pass.
    pub fn provenance(&self) -> &ProvenanceMap {
        &self.provenance
    }

    pub fn options(&self) -> &AggregateOptions {
        &self.options
    }

    fn ensure(&self, hook: &'static str, allowed: &[SessionState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                state: self.state.to_string(),
                hook,
            })
        }
    }

    /// Validate the repositories and point the host at the workspace.
    ///
    /// Validation happens before anything is written, so a misconfigured
    /// repository never leaves a half-built workspace behind.
    pub fn on_config(&mut self, site: &mut SiteConfig) -> Result<()> {
        use SessionState::*;
        self.ensure("on_config", &[Idle, Configured, Merged, Serving])?;

        let mut options = site.aggregate.clone();
        options.resolve_locations(&self.primary_root);
        options.validate()?;
        self.merger.set_fetch_policy(options.fetch);
        self.options = options;

        // On a rebuild the host hands back the config this hook already rewrote
        if !site.config_file_path.starts_with(self.workspace.path()) {
            self.primary_config_file = if site.config_file_path.is_absolute() {
                site.config_file_path.clone()
            } else {
                self.primary_root.join(&site.config_file_path)
            };
        }

        self.primary_origin = match &site.repo_url {
            Some(url) => Origin::classify(url.as_str(), site.primary_branch.as_str()),
            None => Origin::local(self.primary_root.to_string_lossy(), &site.primary_branch),
        };

        let file_name = self
            .primary_config_file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        site.docs_dir = self.workspace.path().join(DOCS_DIR);
        site.config_file_path = self.workspace.config_path(&file_name);

        if self.state != Serving {
            self.state = Configured;
        }
        Ok(())
    }

    /// Rebuild the workspace and the provenance map.
    pub fn on_pre_build(&mut self) -> Result<MergeReport> {
        use SessionState::*;
        self.ensure("on_pre_build", &[Configured, Merged, Serving])?;

        self.provenance.clear();

        let report = self.merger.merge(
            self.workspace.path(),
            &self.primary_root,
            &self.options.repos,
        )?;
        let pages = self.merger.record_provenance(
            &mut self.provenance,
            self.workspace.path(),
            &self.primary_root,
            &self.primary_origin,
            &self.options.repos,
            &report,
        )?;

        info!(
            "Aggregated {} repositories ({} failed), tracking {} pages",
            report.repos.len(),
            report.failures().count(),
            pages
        );

        if self.state != Serving {
            self.state = Merged;
        }
        Ok(report)
    }

    /// Move the host's watches from the workspace to the real sources.
    pub fn on_serve(&mut self, watcher: &mut dyn Watcher) -> Result<()> {
        use SessionState::*;
        self.ensure("on_serve", &[Merged, Serving])?;

        watch::coordinate(
            watcher,
            &self.primary_root,
            &self.primary_config_file,
            &self.options.repos,
        );
        self.state = Serving;
        Ok(())
    }

    /// Set the page's edit URL from its recorded provenance, if any.
    pub fn on_page_context(&self, page: &mut Page) -> Result<()> {
        use SessionState::*;
        self.ensure("on_page_context", &[Merged, Serving])?;

        if let Some(url) = edit_url::resolve(&self.provenance, &page.src_path) {
            page.edit_url = Some(url);
        }
        Ok(())
    }

    /// Edit URL of a page from the last pass, without a page object.
    pub fn edit_url(&self, page_path: &str) -> Option<String> {
        edit_url::resolve(&self.provenance, page_path)
    }

    /// Remove the workspace. A second call is a no-op.
    pub fn on_shutdown(&mut self) -> Result<()> {
        if self.state == SessionState::ShutDown {
            return Ok(());
        }

        self.state = SessionState::ShutDown;
        self.provenance.clear();
        self.workspace.destroy().inspect_err(|e| {
            warn!("{}", e);
        })
    }
}
