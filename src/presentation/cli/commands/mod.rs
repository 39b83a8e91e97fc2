pub mod generic;
pub mod publish;

pub use generic::*;
pub use publish::*;

use std::sync::Arc;

use crate::application::services::DiffDigestReviewer;
use crate::application::use_cases::ReviewPipelineUseCase;
use crate::domain::entities::{RepositoryHandle, ReviewConfig};
use crate::infrastructure::scm::LocalGitAdapter;

/// Pipeline over the system `git` and the offline digest reviewer
fn build_pipeline(config: &ReviewConfig, cleanup_existing: bool) -> ReviewPipelineUseCase {
    let git = LocalGitAdapter::new(RepositoryHandle::from_config(config));
    ReviewPipelineUseCase::new(Arc::new(git), Arc::new(DiffDigestReviewer::new()))
        .with_cleanup(cleanup_existing)
}
