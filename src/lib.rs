//! # Docs Aggregator Library
//!
//! This library merges the markdown documentation of a primary project and
//! any number of secondary repositories (local directories or remote git
//! repositories) into one temporary tree, so a static-site generator can
//! build a single combined site. While merging it records where every page
//! came from, so each rendered page can link to an "edit this page" URL in
//! the right upstream repository.
//!
//! ## Quick Example
//!
//! ```
//! use docs_aggregator::edit_url;
//! use docs_aggregator::provenance::{Origin, ProvenanceMap};
//!
//! let mut provenance = ProvenanceMap::new();
//! provenance.insert(
//!     "admin/foo.md",
//!     Origin::remote("https://example.com/repo.git", "main"),
//! );
//!
//! assert_eq!(
//!     edit_url::resolve(&provenance, "admin/foo.md").as_deref(),
//!     Some("https://example.com/repo/edit/main/docs/admin/foo.md")
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: the host's site configuration and the
//!   repository descriptors declared under its `aggregate` key.
//! - **Workspace (`workspace`)**: the temporary directory the host builds
//!   from, kept alive for a whole serve session.
//! - **Merging (`merger`, `repository`, `git`, `cache`)**: rebuilds the
//!   workspace from the primary project and each repository, in order.
//! - **Provenance (`provenance`, `edit_url`)**: the page → origin map and the
//!   edit URLs derived from it.
//! - **Watching (`watch`)**: points serve-mode file watches at the real
//!   sources instead of the workspace.
//! - **Session (`session`)**: the lifecycle state machine tying it together
//!   behind one method per host hook.
//!
//! ## Execution Flow
//!
//! 1.  **Configure**: validate every repository and redirect the host's
//!     `docs_dir` and config path into the workspace.
//! 2.  **Pre-build**: clear the provenance map, rebuild the workspace, record
//!     the origin of every page.
//! 3.  **Serve** (optional): swap the host's watches for the source paths.
//! 4.  **Page context**: hand out edit URLs from the provenance map.
//! 5.  **Shutdown**: remove the workspace.

pub mod cache;
pub mod config;
pub mod edit_url;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod merger;
pub mod output;
pub mod provenance;
pub mod repository;
pub mod session;
pub mod watch;
pub mod workspace;
