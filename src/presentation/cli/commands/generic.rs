use colored::Colorize;

use super::build_pipeline;
use crate::application::use_cases::PipelineOutcome;
use crate::common::context::RunContext;
use crate::common::result::ReviewResult;
use crate::domain::entities::ReviewConfig;

/// Handler for the generic command: review and print to stdout
pub struct GenericCommand {
    pub config: ReviewConfig,
    pub cleanup_existing: bool,
}

impl GenericCommand {
    pub fn new(config: ReviewConfig, cleanup_existing: bool) -> Self {
        Self {
            config,
            cleanup_existing,
        }
    }

    pub async fn execute(&self, ctx: &RunContext) -> ReviewResult<()> {
        let outcome = build_pipeline(&self.config, self.cleanup_existing)
            .execute(ctx, &self.config)
            .await?;

        match outcome {
            PipelineOutcome::Reviewed { review, .. } => {
                println!("{}", "--- Review result ---".cyan().bold());
                println!("{}", review.trim_end());
                println!("{}", "--- End of review ---".cyan().bold());
            }
            PipelineOutcome::NoChanges { .. } => {
                println!(
                    "{} No differences between origin/{} and origin/{}",
                    "ℹ".blue(),
                    self.config.base_branch,
                    self.config.feature_branch
                );
            }
            PipelineOutcome::EmptyReview { .. } => {
                println!("{} The review generator returned nothing", "⚠".yellow());
            }
        }

        Ok(())
    }
}
