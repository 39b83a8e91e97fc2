use crate::common::context::RunContext;
use crate::domain::entities::{DiffResult, RepositoryState};
use crate::infrastructure::process::ProcessError;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

/// Repository synchronization used by the review pipeline.
///
/// Calls are expected in state-machine order: `clone_or_update`, then
/// `fetch`, then `code_diff`. `cleanup` may run against an existing clone
/// at the start of any run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitService: Send + Sync {
    /// Clone the remote if the local path is absent; reuse an existing clone.
    ///
    /// Returns the state found before any action was taken. A path occupied
    /// by anything other than a git repository is an error and is left as-is.
    async fn clone_or_update(&self, ctx: &RunContext) -> Result<RepositoryState, GitError>;

    /// Update remote-tracking refs, pruning deleted branches
    async fn fetch(&self, ctx: &RunContext) -> Result<(), GitError>;

    /// Three-dot diff `origin/<base>...origin/<feature>` with 10 lines of context
    async fn code_diff(
        &self,
        ctx: &RunContext,
        base_branch: &str,
        feature_branch: &str,
    ) -> Result<DiffResult, GitError>;

    /// Whether `origin/<branch>` resolves locally. A missing ref is `Ok(false)`.
    async fn check_remote_branch_exists(
        &self,
        ctx: &RunContext,
        branch: &str,
    ) -> Result<bool, GitError>;

    /// Reset the clone to the remote base branch and drop untracked files
    async fn cleanup(&self, ctx: &RunContext) -> Result<(), GitError>;
}

/// Which side of the comparison a ref belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSide {
    Base,
    Feature,
}

impl fmt::Display for BranchSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchSide::Base => write!(f, "base"),
            BranchSide::Feature => write!(f, "feature"),
        }
    }
}

/// Errors that can occur while synchronizing a repository
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Local path '{}' exists but is not a git repository. Remove it manually or choose another path", path.display())]
    NotARepository { path: PathBuf },

    #[error("Local path '{}' is not a directory; cannot clone a repository there", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Invalid local path '{}': {reason}", path.display())]
    InvalidLocalPath { path: PathBuf, reason: String },

    #[error("Failed to inspect local path '{}': {source}", path.display())]
    InspectFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create parent directory '{}': {source}", path.display())]
    CreateParentFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to clone {url}: {source}")]
    CloneFailed {
        url: String,
        #[source]
        source: ProcessError,
    },

    #[error("Failed to fetch from origin: {source}")]
    FetchFailed {
        #[source]
        source: ProcessError,
    },

    #[error("Failed to resolve {side} branch '{reference}': {source}")]
    RefResolutionFailed {
        side: BranchSide,
        reference: String,
        #[source]
        source: ProcessError,
    },

    #[error("Failed to compute diff {range}: {source}")]
    DiffFailed {
        range: String,
        #[source]
        source: ProcessError,
    },

    #[error("Failed to check remote branch '{reference}': {source}")]
    BranchCheckFailed {
        reference: String,
        #[source]
        source: ProcessError,
    },

    #[error("Branch name must not be empty")]
    EmptyBranchName,

    #[error("Cleanup failed during {step}: {source}")]
    CleanupFailed {
        step: &'static str,
        #[source]
        source: ProcessError,
    },
}

impl GitError {
    /// The failed git invocation behind this error, if any
    pub fn process_error(&self) -> Option<&ProcessError> {
        match self {
            Self::CloneFailed { source, .. }
            | Self::FetchFailed { source }
            | Self::RefResolutionFailed { source, .. }
            | Self::DiffFailed { source, .. }
            | Self::BranchCheckFailed { source, .. }
            | Self::CleanupFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Captured command output behind this error, if any
    pub fn command_output(&self) -> Option<&str> {
        self.process_error().and_then(ProcessError::output)
    }

    /// Whether git was stopped by cancellation or the run deadline
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self.process_error(),
            Some(ProcessError::Interrupted { .. })
        )
    }
}
