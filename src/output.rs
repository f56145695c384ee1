//! # Output Configuration
//!
//! Controls how the CLI renders its human-readable output.
//!
//! The `--color=never|always|auto` flag picks the mode; in `auto` mode
//! `NO_COLOR`, `CLICOLOR=0`, `CLICOLOR_FORCE=1` and `TERM=dumb` are honoured
//! before falling back to the terminal's own capabilities.
//!
//! ```
//! use docs_aggregator::output::{OutputConfig, emoji};
//!
//! let config = OutputConfig::without_color();
//! assert_eq!(emoji(&config, "✅", "[OK]"), "[OK]");
//! ```

use std::env;

use console::style;

use crate::merger::{MergeReport, RepoOutcome, RepoReport};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from the environment and the `--color` flag.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence alone disables colors (https://no-color.org/)
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colors are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// One line describing how a repository fared during a merge.
pub fn repo_line(config: &OutputConfig, report: &RepoReport) -> String {
    let kind = if report.local { "local" } else { "remote" };
    match &report.outcome {
        RepoOutcome::Merged => format!(
            "{} {} ({}, {})",
            emoji(config, "✅", "[OK]"),
            report.location,
            kind,
            report.branch
        ),
        RepoOutcome::Failed(message) => {
            let message = if config.use_color {
                style(message).red().to_string()
            } else {
                message.clone()
            };
            format!(
                "{} {} ({}, {}): {}",
                emoji(config, "⚠️", "[WARN]"),
                report.location,
                kind,
                report.branch,
                message
            )
        }
    }
}

/// Human-readable summary of a merge pass.
pub fn merge_summary(config: &OutputConfig, report: &MergeReport) -> String {
    let mut lines = vec![format!(
        "{} Copied {} file(s) from the primary project",
        emoji(config, "📄", "[COPY]"),
        report.primary_files
    )];
    lines.extend(report.repos.iter().map(|r| repo_line(config, r)));

    let failed = report.failures().count();
    let merged = report.repos.len() - failed;
    let total = format!("{merged} merged, {failed} failed");
    lines.push(if config.use_color && failed > 0 {
        style(total).yellow().to_string()
    } else {
        total
    });
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: RepoOutcome) -> RepoReport {
        RepoReport {
            location: "https://example.com/repo.git".to_string(),
            branch: "main".to_string(),
            local: false,
            outcome,
        }
    }

    #[test]
    fn test_color_always() {
        let config = OutputConfig::from_env_and_flag("always");
        assert!(config.use_color);
    }

    #[test]
    fn test_color_never() {
        let config = OutputConfig::from_env_and_flag("never");
        assert!(!config.use_color);
    }

    #[test]
    fn test_color_flag_case_insensitive() {
        assert!(OutputConfig::from_env_and_flag("ALWAYS").use_color);
        assert!(!OutputConfig::from_env_and_flag("Never").use_color);
    }

    #[test]
    fn test_emoji_helper() {
        assert_eq!(emoji(&OutputConfig::with_color(), "✅", "[OK]"), "✅");
        assert_eq!(emoji(&OutputConfig::without_color(), "✅", "[OK]"), "[OK]");
    }

    #[test]
    fn test_repo_line_merged() {
        let line = repo_line(&OutputConfig::without_color(), &report(RepoOutcome::Merged));
        assert_eq!(line, "[OK] https://example.com/repo.git (remote, main)");
    }

    #[test]
    fn test_repo_line_failed() {
        let line = repo_line(
            &OutputConfig::without_color(),
            &report(RepoOutcome::Failed("fetch failed".to_string())),
        );
        assert_eq!(
            line,
            "[WARN] https://example.com/repo.git (remote, main): fetch failed"
        );
    }

    #[test]
    fn test_merge_summary_counts() {
        let summary = merge_summary(
            &OutputConfig::without_color(),
            &MergeReport {
                primary_files: 3,
                repos: vec![
                    report(RepoOutcome::Merged),
                    report(RepoOutcome::Failed("boom".to_string())),
                ],
            },
        );

        assert!(summary.starts_with("[COPY] Copied 3 file(s)"));
        assert!(summary.ends_with("1 merged, 1 failed"));
    }
}
