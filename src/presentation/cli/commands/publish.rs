use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;

use super::build_pipeline;
use crate::application::services::PublicUrlResolver;
use crate::application::use_cases::{
    NotificationOutcome, PipelineOutcome, PublishConfig, PublishReport, PublishReviewUseCase,
};
use crate::common::context::RunContext;
use crate::common::result::ReviewResult;
use crate::domain::entities::ReviewConfig;
use crate::domain::value_objects::{PublishTarget, DEFAULT_AWS_REGION};
use crate::infrastructure::notify::SlackWebhookNotifier;
use crate::infrastructure::storage::{StorageFactory, StorageProvider};
use crate::presentation::cli::PublishArgs;

/// Handler for the publish command: review, upload, notify
pub struct PublishCommand {
    pub config: ReviewConfig,
    pub cleanup_existing: bool,
    pub args: PublishArgs,
}

impl PublishCommand {
    pub fn new(config: ReviewConfig, cleanup_existing: bool, args: PublishArgs) -> Self {
        Self {
            config,
            cleanup_existing,
            args,
        }
    }

    /// Region shared by the S3 client and the advertised public URL
    fn aws_region(&self) -> &str {
        self.args
            .aws_region
            .as_deref()
            .map(str::trim)
            .filter(|region| !region.is_empty())
            .unwrap_or(DEFAULT_AWS_REGION)
    }

    fn resolver(&self) -> PublicUrlResolver {
        PublicUrlResolver::new()
            .with_aws_region(self.aws_region())
            .with_signed_url_expiry(Duration::from_secs(self.args.signed_url_expiry * 60))
    }

    pub async fn execute(&self, ctx: &RunContext) -> ReviewResult<()> {
        // Reject the destination before spending time on clone and review
        let target = PublishTarget::parse(&self.args.uri);
        let storage = StorageFactory::new().with_aws_region(self.aws_region());
        storage.backend_for(&target)?;

        let outcome = build_pipeline(&self.config, self.cleanup_existing)
            .execute(ctx, &self.config)
            .await?;

        let review = match outcome {
            PipelineOutcome::Reviewed { review, .. } => review,
            PipelineOutcome::NoChanges { .. } => {
                println!(
                    "{} No differences between origin/{} and origin/{}, nothing published",
                    "ℹ".blue(),
                    self.config.base_branch,
                    self.config.feature_branch
                );
                return Ok(());
            }
            PipelineOutcome::EmptyReview { .. } => {
                println!(
                    "{} The review generator returned nothing, nothing published",
                    "⚠".yellow()
                );
                return Ok(());
            }
        };

        let publish_config = PublishConfig::new(self.args.uri.clone())
            .with_content_type(self.args.content_type.clone())
            .with_webhook_url(self.args.slack_webhook_url.clone());

        let notifier = SlackWebhookNotifier::new()
            .with_timeout(Duration::from_secs(self.args.http_timeout));

        let report = PublishReviewUseCase::new(Arc::new(storage), Arc::new(notifier))
            .with_resolver(self.resolver())
            .execute(ctx, &self.config, &publish_config, &review)
            .await?;

        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &PublishReport) {
    println!("{} Review uploaded to {}", "✓".green(), report.storage_uri.bold());

    if let Some(url) = &report.public_url {
        println!("  {} {}", "URL:".bold(), url);
    }

    match &report.notification {
        NotificationOutcome::Sent => println!("  {} Slack notified", "✓".green()),
        NotificationOutcome::NotConfigured => {
            println!("  {} No Slack webhook configured, notification skipped", "ℹ".blue())
        }
        NotificationOutcome::Interrupted => {
            println!("  {} Interrupted before notifying Slack", "⚠".yellow())
        }
        NotificationOutcome::Failed { error } => {
            println!("  {} Slack notification failed: {}", "⚠".yellow(), error)
        }
    }
}
