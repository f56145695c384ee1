//! In-session record of fetched remote branches

use std::collections::HashSet;

use crate::config::FetchPolicy;

/// Cache key combining URL and branch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub url: String,
    pub branch: String,
}

impl CacheKey {
    pub fn new(url: &str, branch: &str) -> Self {
        Self {
            url: url.to_string(),
            branch: branch.to_string(),
        }
    }
}

/// Tracks which remote branches already sit in the workspace's object store.
///
/// The store itself lives in the workspace's `.git` directory, so this cache
/// is only meaningful for as long as that workspace exists.
#[derive(Debug, Clone, Default)]
pub struct FetchCache {
    policy: FetchPolicy,
    fetched: HashSet<CacheKey>,
}

impl FetchCache {
    /// Create an empty cache following `policy`
    pub fn new(policy: FetchPolicy) -> Self {
        Self {
            policy,
            fetched: HashSet::new(),
        }
    }

    pub fn set_policy(&mut self, policy: FetchPolicy) {
        self.policy = policy;
    }

    /// Whether `key` must be fetched before it can be checked out
    pub fn needs_fetch(&self, key: &CacheKey) -> bool {
        match self.policy {
            FetchPolicy::Always => true,
            FetchPolicy::Once => !self.fetched.contains(key),
        }
    }

    /// Record a successful fetch
    pub fn mark_fetched(&mut self, key: CacheKey) {
        self.fetched.insert(key);
    }
}
