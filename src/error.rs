//! # Error Handling
//!
//! This module defines the centralized error type for `docs-aggregator`. It
//! uses `thiserror` to build a single `Error` enum covering every failure the
//! aggregation pipeline can hit, and a `Result<T>` alias used across the
//! library.
//!
//! The variants fall into three groups, which the rest of the crate treats
//! differently:
//!
//! - **Fatal configuration errors** (`Configuration`): raised while loading
//!   or validating the site configuration, before the workspace is touched.
//! - **Per-repository merge errors** (`GitCommand`, `RemoteFetch`,
//!   `Filesystem`, `Glob`): raised while layering one repository into the
//!   workspace. The merger catches these, logs them as warnings and moves on
//!   to the next repository.
//! - **Lifecycle errors** (`Teardown`, `InvalidTransition`): raised by the
//!   session when the workspace cannot be removed, or when a host hook is
//!   called out of order.

use thiserror::Error;

/// Main error type for docs-aggregator operations
#[derive(Error, Debug)]
pub enum Error {
    /// The site configuration or one of its repository descriptors is invalid.
    ///
    /// Optionally carries a hint about how to fix the configuration.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Configuration {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A git command exited unsuccessfully or could not be spawned.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// Fetching a branch from a remote repository failed.
    #[error("Failed to fetch {url}@{branch}: {message}")]
    RemoteFetch {
        url: String,
        branch: String,
        message: String,
    },

    /// An error occurred while copying or scanning files on disk.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// The workspace could not be removed at shutdown.
    #[error("Failed to remove workspace {path}: {message}")]
    Teardown { path: String, message: String },

    /// A session hook was called in a state that does not allow it.
    #[error("Cannot run {hook} while the session is {state}")]
    InvalidTransition { state: String, hook: &'static str },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Filesystem {
            message: err.to_string(),
        }
    }
}
