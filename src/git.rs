use std::path::Path;
use std::process::{Command, Output};

use log::debug;
use sha2::{Digest, Sha256};

use crate::error::Error;
use crate::filesystem::is_glob;

/// Number of hex characters kept from the URL digest when naming a remote
const REMOTE_ID_LEN: usize = 12;

/// Derive the remote name used for a repository URL
///
/// The name is a truncated SHA-256 of the URL, so it is stable across runs
/// and safe to use as a git remote name.
pub fn remote_name(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hex = hex::encode(digest);
    format!("src-{}", &hex[..REMOTE_ID_LEN])
}

/// Run `git <args>` inside `dir`, returning the raw output on success
fn run(dir: &Path, args: &[&str]) -> Result<Output, Error> {
    debug!("git {} (in {})", args.join(" "), dir.display());

    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            dir: dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.display().to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(output)
}

/// Initialize `dir` as a git repository (safe to repeat)
pub fn init(dir: &Path) -> Result<(), Error> {
    run(dir, &["init", "--quiet", "."])?;
    Ok(())
}

/// List the names of the remotes registered in `dir`
pub fn remotes(dir: &Path) -> Result<Vec<String>, Error> {
    let output = run(dir, &["remote"])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Register `url` as the remote `name`
pub fn add_remote(dir: &Path, name: &str, url: &str) -> Result<(), Error> {
    run(dir, &["remote", "add", name, url])?;
    Ok(())
}

/// Fetch `branch` from the remote `name`
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Personal access tokens
/// - Any authentication configured in ~/.gitconfig
pub fn fetch(dir: &Path, name: &str, url: &str, branch: &str) -> Result<(), Error> {
    let refspec = format!("+refs/heads/{branch}:refs/remotes/{name}/{branch}");
    run(dir, &["fetch", "--quiet", name, &refspec]).map_err(|e| {
        let stderr = match e {
            Error::GitCommand { stderr, .. } => stderr,
            other => other.to_string(),
        };

        // Provide helpful error message for common auth failures
        let message = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure you have access to the repository.\n\
                For private repos, ensure you have:\n\
                - SSH key added to ssh-agent\n\
                - Git credentials configured\n\
                - Personal access token set up\n\
                Error: {}",
                stderr
            )
        } else {
            stderr
        };

        Error::RemoteFetch {
            url: url.to_string(),
            branch: branch.to_string(),
            message,
        }
    })?;
    Ok(())
}

/// Pathspec for an include entry.
///
/// Glob includes use git's `glob` magic, where `*` stops at `/` and only `**`
/// crosses directories, the same way includes are expanded on disk.
pub fn pathspec(include: &str) -> String {
    if is_glob(include) {
        format!(":(glob){include}")
    } else {
        include.to_string()
    }
}

/// Check out `paths` from `<name>/<branch>` into the working tree of `dir`
pub fn checkout_paths(dir: &Path, name: &str, branch: &str, paths: &[String]) -> Result<(), Error> {
    let reference = format!("{name}/{branch}");
    let pathspecs: Vec<String> = paths.iter().map(|p| pathspec(p)).collect();
    let mut args = vec!["checkout", reference.as_str(), "--"];
    args.extend(pathspecs.iter().map(String::as_str));
    run(dir, &args)?;
    Ok(())
}

/// List the files under `path` at `<name>/<branch>`, recursively
pub fn list_files(dir: &Path, name: &str, branch: &str, path: &str) -> Result<Vec<String>, Error> {
    let reference = format!("{name}/{branch}");
    let output = run(
        dir,
        &["ls-tree", "-r", "--name-only", reference.as_str(), "--", path],
    )?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
