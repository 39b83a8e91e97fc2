use crate::application::services::review_generator::{ReviewGenerationError, ReviewGenerator};
use crate::common::context::{Interrupted, RunContext};
use crate::domain::entities::{DiffResult, RepositoryState, ReviewConfig};
use crate::infrastructure::scm::{GitError, GitService};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use validator::Validate;

/// Review pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid review configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("Remote branch 'origin/{branch}' does not exist")]
    BranchNotFound { branch: String },

    #[error(transparent)]
    Review(#[from] ReviewGenerationError),

    #[error("Review pipeline interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

impl PipelineError {
    pub fn is_interrupted(&self) -> bool {
        match self {
            Self::Interrupted(_) => true,
            Self::Review(ReviewGenerationError::Interrupted(_)) => true,
            Self::Git(e) => e.is_interrupted(),
            _ => false,
        }
    }
}

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The branches do not differ; nothing to review
    NoChanges { repository_state: RepositoryState },

    /// The generator returned nothing; nothing to publish
    EmptyReview { repository_state: RepositoryState },

    Reviewed {
        repository_state: RepositoryState,
        diff: DiffResult,
        review: String,
    },
}

impl PipelineOutcome {
    /// The review text, when there is one to publish
    pub fn review(&self) -> Option<&str> {
        match self {
            Self::Reviewed { review, .. } => Some(review),
            _ => None,
        }
    }

    /// State of the local path when the run started
    pub fn repository_state(&self) -> RepositoryState {
        match self {
            Self::NoChanges { repository_state }
            | Self::EmptyReview { repository_state }
            | Self::Reviewed {
                repository_state, ..
            } => *repository_state,
        }
    }
}

/// Clone or reuse, fetch, diff, then review.
///
/// An existing clone is first reset to the remote base branch unless
/// cleanup is disabled.
pub struct ReviewPipelineUseCase {
    git: Arc<dyn GitService>,
    generator: Arc<dyn ReviewGenerator>,
    cleanup_existing: bool,
}

impl ReviewPipelineUseCase {
    pub fn new(git: Arc<dyn GitService>, generator: Arc<dyn ReviewGenerator>) -> Self {
        Self {
            git,
            generator,
            cleanup_existing: true,
        }
    }

    pub fn with_cleanup(mut self, cleanup_existing: bool) -> Self {
        self.cleanup_existing = cleanup_existing;
        self
    }

    pub async fn execute(
        &self,
        ctx: &RunContext,
        config: &ReviewConfig,
    ) -> Result<PipelineOutcome, PipelineError> {
        config.validate()?;
        if let Some(reason) = ctx.interruption() {
            return Err(reason.into());
        }

        let repository_state = self.git.clone_or_update(ctx).await?;
        info!(
            path = %config.local_path.display(),
            state = %repository_state,
            "Local repository ready"
        );

        if repository_state == RepositoryState::PresentGitRepo && self.cleanup_existing {
            self.git.cleanup(ctx).await?;
        }

        self.git.fetch(ctx).await?;

        for branch in [&config.base_branch, &config.feature_branch] {
            if !self.git.check_remote_branch_exists(ctx, branch).await? {
                return Err(PipelineError::BranchNotFound {
                    branch: branch.clone(),
                });
            }
        }

        let diff = self
            .git
            .code_diff(ctx, &config.base_branch, &config.feature_branch)
            .await?;

        if diff.is_empty() {
            info!(
                base = %config.base_branch,
                feature = %config.feature_branch,
                "No differences between branches, skipping review"
            );
            return Ok(PipelineOutcome::NoChanges { repository_state });
        }

        let review = self.generator.generate(ctx, config, &diff).await?;
        if review.trim().is_empty() {
            warn!("Review generator returned an empty result, skipping");
            return Ok(PipelineOutcome::EmptyReview { repository_state });
        }

        Ok(PipelineOutcome::Reviewed {
            repository_state,
            diff,
            review,
        })
    }
}
