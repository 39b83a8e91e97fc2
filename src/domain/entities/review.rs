use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Review mode errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewModeError {
    #[error("Unsupported review mode: {0} (expected 'detail' or 'release')")]
    Unsupported(String),
}

/// Kind of review requested from the review generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMode {
    /// Line-level review of the change
    #[default]
    Detail,
    /// Go/no-go assessment for a release
    Release,
}

impl fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewMode::Detail => write!(f, "detail"),
            ReviewMode::Release => write!(f, "release"),
        }
    }
}

impl FromStr for ReviewMode {
    type Err = ReviewModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "detail" => Ok(ReviewMode::Detail),
            "release" => Ok(ReviewMode::Release),
            _ => Err(ReviewModeError::Unsupported(s.to_string())),
        }
    }
}

/// Immutable settings for one review run, built once from the command line
#[derive(Debug, Clone, PartialEq, Eq, Validate, Serialize, Deserialize)]
pub struct ReviewConfig {
    pub review_mode: ReviewMode,

    #[validate(length(min = 1, message = "model name must not be empty"))]
    pub model: String,

    #[validate(length(min = 1, message = "repository URL is required"))]
    pub repo_url: String,

    #[validate(length(min = 1, message = "base branch must not be empty"))]
    pub base_branch: String,

    #[validate(length(min = 1, message = "feature branch is required"))]
    pub feature_branch: String,

    pub ssh_key_path: Option<PathBuf>,

    pub local_path: PathBuf,

    pub skip_host_key_check: bool,
}

impl ReviewConfig {
    /// Trim surrounding whitespace from every user-supplied string
    pub fn normalized(mut self) -> Self {
        self.model = self.model.trim().to_string();
        self.repo_url = self.repo_url.trim().to_string();
        self.base_branch = self.base_branch.trim().to_string();
        self.feature_branch = self.feature_branch.trim().to_string();
        self
    }
}

/// Unified diff between two remote-tracking refs.
///
/// An empty diff means "no changes" and is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiffResult(String);

impl DiffResult {
    pub fn new(diff: impl Into<String>) -> Self {
        Self(diff.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DiffResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The review document handed to storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewArtifact {
    pub repo_url: String,
    pub base_branch: String,
    pub feature_branch: String,
    pub markdown_body: String,
    pub generated_at: DateTime<Utc>,
}

impl ReviewArtifact {
    /// Assemble an artifact from the run configuration and the review text
    pub fn new(config: &ReviewConfig, markdown_body: impl Into<String>) -> Self {
        Self {
            repo_url: config.repo_url.clone(),
            base_branch: config.base_branch.clone(),
            feature_branch: config.feature_branch.clone(),
            markdown_body: markdown_body.into(),
            generated_at: Utc::now(),
        }
    }
}
