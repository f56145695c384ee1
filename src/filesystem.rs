//! On-disk file tree helpers used to assemble the workspace

use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Pattern matching hidden entries (`.git`, `.venv`, `.cache`, ...).
pub const HIDDEN_PATTERN: &str = ".*";

/// Extensions recognised as markdown sources.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Name of the git metadata directory kept between build passes.
pub const GIT_DIR: &str = ".git";

/// Returns true if the file name matches any of the exclusion patterns
pub fn is_excluded(name: &str, exclude: &[Pattern]) -> bool {
    exclude.iter().any(|p| p.matches(name))
}

/// The pattern list that drops hidden files and directories
pub fn hidden_patterns() -> Result<Vec<Pattern>> {
    Ok(vec![Pattern::new(HIDDEN_PATTERN)?])
}

/// Check whether a path has a markdown extension
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|m| ext.eq_ignore_ascii_case(m))
        })
}

/// Render a relative path with forward slashes, whatever the platform
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Recursively copy `src` into `dst`, overwriting existing files.
///
/// Entries whose file name matches one of `exclude` are skipped at any depth,
/// along with everything below them. Directories that already exist in `dst`
/// are merged into rather than replaced. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path, exclude: &[Pattern]) -> Result<usize> {
    if !src.is_dir() {
        return Err(Error::Filesystem {
            message: format!("Source directory not found: {}", src.display()),
        });
    }

    fs::create_dir_all(dst).map_err(|e| Error::Filesystem {
        message: format!("Failed to create directory '{}': {}", dst.display(), e),
    })?;

    let mut copied = 0;
    let walker = WalkDir::new(src).into_iter().filter_entry(|e| {
        // Always allow the root directory (depth 0) to be processed
        e.depth() == 0 || !is_excluded(&e.file_name().to_string_lossy(), exclude)
    });

    for entry in walker {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::Filesystem {
                message: e.to_string(),
            })?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", target.display(), e),
            })?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copy a single file, creating parent directories and replacing the target
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
            message: format!("Failed to create directory '{}': {}", parent.display(), e),
        })?;
    }

    // A directory in the way of a file (or a read-only file) would make fs::copy fail
    if dst.is_dir() {
        fs::remove_dir_all(dst)?;
    } else if dst.exists() {
        fs::remove_file(dst)?;
    }

    fs::copy(src, dst).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to copy '{}' to '{}': {}",
            src.display(),
            dst.display(),
            e
        ),
    })?;
    Ok(())
}

/// Remove every entry of `dir` except the ones named in `keep`
pub fn clear_dir(dir: &Path, keep: &[&str]) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if keep.iter().any(|k| name == *k) {
            continue;
        }

        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }

    Ok(())
}

/// List markdown files under `root`, as paths relative to `root`.
///
/// Returns an empty list when `root` does not exist. Results are sorted.
pub fn markdown_files(root: &Path, exclude: &[Pattern]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !is_excluded(&e.file_name().to_string_lossy(), exclude)
        });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| Error::Filesystem {
                    message: e.to_string(),
                })?;
            files.push(relative.to_path_buf());
        }
    }

    Ok(files)
}

/// Whether an include entry contains glob metacharacters
pub fn is_glob(include: &str) -> bool {
    include.contains(['*', '?', '['])
}

/// Options used wherever an include glob is matched.
///
/// `*` and `?` never cross a `/`; only `**` spans directories.
pub const INCLUDE_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Whether a repository-relative path is selected by an include entry.
///
/// Plain includes select the path itself and everything below it, the way
/// git pathspecs do. Glob includes select a path when they match it or one
/// of its parent directories.
pub fn include_matches(include: &str, path: &str) -> Result<bool> {
    let include = include.trim_end_matches('/');
    if is_glob(include) {
        let pattern = Pattern::new(include)?;
        let parents = path.match_indices('/').map(|(end, _)| &path[..end]);
        return Ok(std::iter::once(path)
            .chain(parents)
            .any(|candidate| pattern.matches_with(candidate, INCLUDE_MATCH_OPTIONS)));
    }
    Ok(path == include || path.starts_with(&format!("{}/", include)))
}

/// Whether any component of a relative path is hidden
pub fn is_hidden_path(relative: &Path, hidden: &[Pattern]) -> bool {
    relative
        .components()
        .any(|c| is_excluded(&c.as_os_str().to_string_lossy(), hidden))
}
