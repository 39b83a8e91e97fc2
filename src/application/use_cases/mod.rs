pub mod publish_review;
pub mod review_pipeline;

pub use publish_review::{
    NotificationOutcome, PublishConfig, PublishError, PublishReport, PublishReviewUseCase,
};
pub use review_pipeline::{PipelineError, PipelineOutcome, ReviewPipelineUseCase};
