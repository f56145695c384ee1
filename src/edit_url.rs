//! Edit-page URL resolution from recorded provenance

use crate::config::DOCS_DIR;
use crate::provenance::{Origin, ProvenanceMap};

/// Strip a trailing slash and a `.git` suffix from a repository URL.
///
/// # Examples
///
/// ```
/// use docs_aggregator::edit_url::normalize_location;
///
/// assert_eq!(
///     normalize_location("https://example.com/repo.git/"),
///     "https://example.com/repo"
/// );
/// ```
pub fn normalize_location(location: &str) -> &str {
    let location = location.strip_suffix('/').unwrap_or(location);
    location.strip_suffix(".git").unwrap_or(location)
}

/// Build the edit URL of `page_path` for a remote origin.
///
/// Returns `None` for local origins, which have no hosted page to edit.
pub fn edit_url_for(origin: &Origin, page_path: &str) -> Option<String> {
    if origin.is_local() {
        return None;
    }

    let page_path = page_path.replace('\\', "/");
    Some(format!(
        "{}/edit/{}/{}/{}",
        normalize_location(&origin.location),
        origin.branch,
        DOCS_DIR,
        page_path.trim_start_matches('/')
    ))
}

/// Resolve the edit URL of a page from the provenance map.
///
/// `None` means the host should keep its own default.
pub fn resolve(provenance: &ProvenanceMap, page_path: &str) -> Option<String> {
    let origin = provenance.get(page_path)?;
    edit_url_for(origin, page_path)
}
