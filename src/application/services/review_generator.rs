use crate::common::context::{Interrupted, RunContext};
use crate::domain::entities::{DiffResult, ReviewConfig, ReviewMode};
use crate::domain::value_objects::repository_path;
use async_trait::async_trait;
use std::fmt::Write as _;
use thiserror::Error;

/// Review generation errors
#[derive(Debug, Error)]
pub enum ReviewGenerationError {
    #[error("Review generation failed: {0}")]
    Failed(String),

    #[error("Review generation interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

/// Produces a Markdown review for a diff
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewGenerator: Send + Sync {
    async fn generate(
        &self,
        ctx: &RunContext,
        config: &ReviewConfig,
        diff: &DiffResult,
    ) -> Result<String, ReviewGenerationError>;
}

/// Per-file line counts from a unified diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub additions: usize,
    pub deletions: usize,
}

/// Summarize a `git diff` by file.
///
/// Only lines inside hunks are counted, so `---`/`+++` headers are skipped
/// while a removed line that itself starts with `--` is still a deletion.
pub fn summarize_diff(diff: &str) -> Vec<FileChange> {
    let mut files: Vec<FileChange> = Vec::new();
    let mut in_hunk = false;

    for line in diff.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            files.push(FileChange {
                path: path_from_diff_header(rest),
                additions: 0,
                deletions: 0,
            });
            in_hunk = false;
            continue;
        }

        let Some(current) = files.last_mut() else {
            continue;
        };

        if line.starts_with("@@") {
            in_hunk = true;
        } else if in_hunk {
            if line.starts_with('+') {
                current.additions += 1;
            } else if line.starts_with('-') {
                current.deletions += 1;
            }
        }
    }

    files
}

/// Pull the post-image path out of `a/<path> b/<path>`
fn path_from_diff_header(header: &str) -> String {
    let header = header.trim();

    // Unrenamed files repeat the same path on both sides, which
    // disambiguates paths that contain " b/"
    if header.len() % 2 == 1 && header.starts_with("a/") {
        let half = (header.len() - 1) / 2;
        if header.is_char_boundary(half) && header.is_char_boundary(half + 3) {
            let (left, right) = header.split_at(half);
            if let Some(right) = right.strip_prefix(" b/") {
                if left.strip_prefix("a/") == Some(right) {
                    return right.to_string();
                }
            }
        }
    }

    match header.rsplit_once(" b/") {
        Some((_, path)) => path.to_string(),
        None => header.to_string(),
    }
}

/// Shortest backtick fence that cannot be closed by the content
fn code_fence(content: &str) -> String {
    let mut longest = 0;
    let mut current = 0;
    for ch in content.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

/// Offline [`ReviewGenerator`]: a structured digest of the change set
/// (per-file line counts plus the full diff) rather than model output.
#[derive(Debug, Clone, Default)]
pub struct DiffDigestReviewer;

impl DiffDigestReviewer {
    pub fn new() -> Self {
        Self
    }

    fn render(config: &ReviewConfig, diff: &DiffResult) -> String {
        let files = summarize_diff(diff.as_str());
        let additions: usize = files.iter().map(|f| f.additions).sum();
        let deletions: usize = files.iter().map(|f| f.deletions).sum();

        let mut out = String::new();
        let _ = writeln!(out, "# Code review: {}", repository_path(&config.repo_url));
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "- **Branch:** `{}` ← `{}`",
            config.base_branch, config.feature_branch
        );
        let _ = writeln!(out, "- **Mode:** `{}`", config.review_mode);
        let _ = writeln!(out, "- **Model:** `{}`", config.model);
        let _ = writeln!(out);

        let focus = match config.review_mode {
            ReviewMode::Detail => "Line-level review of every changed file.",
            ReviewMode::Release => "Release readiness: scope and size of the change set.",
        };
        let _ = writeln!(out, "{focus}");
        let _ = writeln!(out);

        let _ = writeln!(out, "## Changed files");
        let _ = writeln!(out);
        let _ = writeln!(out, "| File | Added | Removed |");
        let _ = writeln!(out, "|------|------:|--------:|");
        for file in &files {
            let _ = writeln!(
                out,
                "| `{}` | {} | {} |",
                file.path.replace('|', "\\|"),
                file.additions,
                file.deletions
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "**Total:** {} file(s), +{} / -{}",
            files.len(),
            additions,
            deletions
        );

        if config.review_mode == ReviewMode::Detail {
            let fence = code_fence(diff.as_str());
            let _ = writeln!(out);
            let _ = writeln!(out, "## Diff");
            let _ = writeln!(out);
            let _ = writeln!(out, "{fence}diff");
            let _ = writeln!(out, "{}", diff.as_str().trim_end());
            let _ = writeln!(out, "{fence}");
        }

        out
    }
}

#[async_trait]
impl ReviewGenerator for DiffDigestReviewer {
    async fn generate(
        &self,
        ctx: &RunContext,
        config: &ReviewConfig,
        diff: &DiffResult,
    ) -> Result<String, ReviewGenerationError> {
        if let Some(reason) = ctx.interruption() {
            return Err(reason.into());
        }
        Ok(Self::render(config, diff))
    }
}
