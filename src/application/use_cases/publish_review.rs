use crate::application::services::public_url::PublicUrlResolver;
use crate::common::context::RunContext;
use crate::domain::entities::{ReviewArtifact, ReviewConfig};
use crate::domain::value_objects::PublishTarget;
use crate::infrastructure::notify::{NotificationMessage, Notifier};
use crate::infrastructure::storage::{
    render_review_document, StorageError, StorageProvider, DEFAULT_CONTENT_TYPE,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Publish errors.
///
/// Only the storage write can fail a publish; link resolution and
/// notification problems are logged and reported in [`PublishReport`].
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to publish review to {uri}: {source}")]
    Storage {
        uri: String,
        #[source]
        source: StorageError,
    },
}

/// Where and how to publish one review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    pub storage_uri: String,
    pub content_type: String,
    pub webhook_url: Option<String>,
}

impl PublishConfig {
    pub fn new(storage_uri: impl Into<String>) -> Self {
        Self {
            storage_uri: storage_uri.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            webhook_url: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Webhook to notify; blank values count as unset
    pub fn with_webhook_url(mut self, webhook_url: Option<String>) -> Self {
        self.webhook_url = webhook_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        self
    }
}

/// What happened to the notification after a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent,
    /// No webhook configured
    NotConfigured,
    /// The run was cancelled or timed out after the write
    Interrupted,
    Failed { error: String },
}

/// Result of a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub storage_uri: String,
    /// Link announced to readers; absent when the run was interrupted
    /// before it could be resolved
    pub public_url: Option<String>,
    pub notification: NotificationOutcome,
}

/// Write the review, resolve a readable link, then notify.
///
/// Steps run strictly in that order, and only the write decides whether
/// the publish succeeded.
pub struct PublishReviewUseCase {
    storage: Arc<dyn StorageProvider>,
    notifier: Arc<dyn Notifier>,
    resolver: PublicUrlResolver,
}

impl PublishReviewUseCase {
    pub fn new(storage: Arc<dyn StorageProvider>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            storage,
            notifier,
            resolver: PublicUrlResolver::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: PublicUrlResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// HTML content types get a rendered page; anything else the Markdown as-is
    fn render_payload(artifact: &ReviewArtifact, content_type: &str) -> Vec<u8> {
        if content_type.trim().to_ascii_lowercase().starts_with("text/html") {
            render_review_document(artifact).into_bytes()
        } else {
            artifact.markdown_body.clone().into_bytes()
        }
    }

    pub async fn execute(
        &self,
        ctx: &RunContext,
        review_config: &ReviewConfig,
        publish_config: &PublishConfig,
        review_markdown: &str,
    ) -> Result<PublishReport, PublishError> {
        let target = PublishTarget::parse(&publish_config.storage_uri);
        let storage_error = |source| PublishError::Storage {
            uri: target.uri().to_string(),
            source,
        };

        let backend = self.storage.backend_for(&target).map_err(storage_error)?;

        let artifact = ReviewArtifact::new(review_config, review_markdown);
        let payload = Self::render_payload(&artifact, &publish_config.content_type);

        backend
            .writer
            .write(ctx, &target, payload, &publish_config.content_type)
            .await
            .map_err(storage_error)?;

        info!(uri = %target, "Review uploaded to storage");

        if let Some(reason) = ctx.interruption() {
            warn!(uri = %target, reason = %reason, "Upload finished but run was interrupted, skipping notification");
            return Ok(PublishReport {
                storage_uri: target.uri().to_string(),
                public_url: None,
                notification: NotificationOutcome::Interrupted,
            });
        }

        let public_url = self
            .resolver
            .resolve(ctx, &target, backend.signer.as_deref())
            .await;

        let notification = match &publish_config.webhook_url {
            None => {
                info!(uri = %target, "No webhook URL configured, skipping notification");
                NotificationOutcome::NotConfigured
            }
            Some(webhook_url) => {
                let message =
                    NotificationMessage::review_uploaded(&public_url, target.uri(), review_config);
                match self.notifier.send(ctx, webhook_url, &message).await {
                    Ok(()) => {
                        info!(uri = %target, "Review link posted");
                        NotificationOutcome::Sent
                    }
                    Err(e) => {
                        // The review is already stored; a failed notification
                        // does not fail the publish
                        error!(error = %e, "Notification failed after successful upload");
                        NotificationOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            }
        };

        Ok(PublishReport {
            storage_uri: target.uri().to_string(),
            public_url: Some(public_url),
            notification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ReviewMode;
    use crate::infrastructure::notify::notifier_interface::MockNotifier;
    use crate::infrastructure::notify::NotifyError;
    use crate::infrastructure::storage::storage_interface::{
        MockStorageProvider, MockStorageWriter, MockUrlSigner,
    };
    use crate::infrastructure::storage::StorageBackend;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::sync::Mutex;

    fn review_config() -> ReviewConfig {
        ReviewConfig {
            review_mode: ReviewMode::Detail,
            model: "gemini-2.5-flash".to_string(),
            repo_url: "git@github.com:example/service.git".to_string(),
            base_branch: "main".to_string(),
            feature_branch: "feature/x".to_string(),
            ssh_key_path: None,
            local_path: PathBuf::from("reviewerRepos/service"),
            skip_host_key_check: false,
        }
    }

    fn provider_with(writer: MockStorageWriter, signer: Option<MockUrlSigner>) -> MockStorageProvider {
        let backend = StorageBackend {
            writer: Arc::new(writer),
            signer: signer.map(|s| Arc::new(s) as Arc<dyn crate::infrastructure::storage::UrlSigner>),
        };
        let mut provider = MockStorageProvider::new();
        provider
            .expect_backend_for()
            .returning(move |_| Ok(backend.clone()));
        provider
    }

    fn accepting_writer() -> MockStorageWriter {
        let mut writer = MockStorageWriter::new();
        writer.expect_write().times(1).returning(|_, _, _, _| Ok(()));
        writer
    }

    fn signer_returning(url: &'static str) -> MockUrlSigner {
        let mut signer = MockUrlSigner::new();
        signer
            .expect_signed_url()
            .returning(move |_, _, _| Ok(url.to_string()));
        signer
    }

    #[tokio::test]
    async fn test_gcs_publish_notifies_with_signed_url() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .withf(|_, webhook, message| {
                webhook == "https://hooks.example.com/T/B/X"
                    && message
                        .body
                        .contains("<https://signed.example.com/r.html|gs://reviews/r.html>")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let provider = provider_with(
            accepting_writer(),
            Some(signer_returning("https://signed.example.com/r.html")),
        );
        let use_case = PublishReviewUseCase::new(Arc::new(provider), Arc::new(notifier));
        let publish = PublishConfig::new("gs://reviews/r.html")
            .with_webhook_url(Some("https://hooks.example.com/T/B/X".to_string()));

        let report = use_case
            .execute(&RunContext::new(), &review_config(), &publish, "# Review")
            .await
            .unwrap();

        assert_eq!(
            report,
            PublishReport {
                storage_uri: "gs://reviews/r.html".to_string(),
                public_url: Some("https://signed.example.com/r.html".to_string()),
                notification: NotificationOutcome::Sent,
            }
        );
    }

    #[tokio::test]
    async fn test_html_payload_and_content_type() {
        let captured: Arc<Mutex<Option<(Vec<u8>, String)>>> = Arc::new(Mutex::new(None));
        let sink = captured.clone();

        let mut writer = MockStorageWriter::new();
        writer
            .expect_write()
            .times(1)
            .returning(move |_, _, payload, content_type| {
                *sink.lock().unwrap() = Some((payload, content_type.to_string()));
                Ok(())
            });

        let use_case = PublishReviewUseCase::new(
            Arc::new(provider_with(writer, None)),
            Arc::new(MockNotifier::new()),
        );

        use_case
            .execute(
                &RunContext::new(),
                &review_config(),
                &PublishConfig::new("s3://reviews/r.html"),
                "**bold**",
            )
            .await
            .unwrap();

        let (payload, content_type) = captured.lock().unwrap().take().unwrap();
        let html = String::from_utf8(payload).unwrap();
        assert_eq!(content_type, "text/html; charset=utf-8");
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[tokio::test]
    async fn test_non_html_content_type_writes_markdown() {
        let captured: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();

        let mut writer = MockStorageWriter::new();
        writer.expect_write().returning(move |_, _, payload, _| {
            *sink.lock().unwrap() = payload;
            Ok(())
        });

        let use_case = PublishReviewUseCase::new(
            Arc::new(provider_with(writer, None)),
            Arc::new(MockNotifier::new()),
        );
        let publish = PublishConfig::new("s3://reviews/r.md").with_content_type("text/markdown");

        use_case
            .execute(&RunContext::new(), &review_config(), &publish, "# Raw")
            .await
            .unwrap();

        assert_eq!(captured.lock().unwrap().as_slice(), b"# Raw");
    }

    #[tokio::test]
    async fn test_s3_publish_uses_public_url() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .withf(|_, _, message| {
                message
                    .body
                    .contains("<https://reviews.s3.eu-west-1.amazonaws.com/a/r.html|s3://reviews/a/r.html>")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let use_case = PublishReviewUseCase::new(
            Arc::new(provider_with(accepting_writer(), None)),
            Arc::new(notifier),
        )
        .with_resolver(PublicUrlResolver::new().with_aws_region("eu-west-1"));
        let publish = PublishConfig::new("s3://reviews/a/r.html")
            .with_webhook_url(Some("https://hooks.example.com/x".to_string()));

        let report = use_case
            .execute(&RunContext::new(), &review_config(), &publish, "# Review")
            .await
            .unwrap();

        assert_eq!(
            report.public_url.as_deref(),
            Some("https://reviews.s3.eu-west-1.amazonaws.com/a/r.html")
        );
    }

    #[tokio::test]
    async fn test_write_failure_fails_publish_without_notifying() {
        let mut writer = MockStorageWriter::new();
        writer.expect_write().returning(|_, target, _, _| {
            Err(StorageError::UnsupportedScheme {
                uri: target.uri().to_string(),
            })
        });
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(0);
        let mut signer = MockUrlSigner::new();
        signer.expect_signed_url().times(0);

        let use_case =
            PublishReviewUseCase::new(Arc::new(provider_with(writer, Some(signer))), Arc::new(notifier));
        let publish = PublishConfig::new("gs://reviews/r.html")
            .with_webhook_url(Some("https://hooks.example.com/x".to_string()));

        let result = use_case
            .execute(&RunContext::new(), &review_config(), &publish, "# Review")
            .await;

        match result {
            Err(PublishError::Storage { uri, .. }) => assert_eq!(uri, "gs://reviews/r.html"),
            other => panic!("expected storage error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unsupported_uri_fails_before_write() {
        let mut provider = MockStorageProvider::new();
        provider.expect_backend_for().returning(|target| {
            Err(StorageError::UnsupportedScheme {
                uri: target.uri().to_string(),
            })
        });

        let use_case = PublishReviewUseCase::new(Arc::new(provider), Arc::new(MockNotifier::new()));
        let result = use_case
            .execute(
                &RunContext::new(),
                &review_config(),
                &PublishConfig::new("/tmp/review.html"),
                "# Review",
            )
            .await;

        assert!(matches!(
            result,
            Err(PublishError::Storage {
                source: StorageError::UnsupportedScheme { .. },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_notification_failure_still_succeeds() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(1).returning(|_, _, _| {
            Err(NotifyError::Rejected {
                status: 500,
                body: "boom".to_string(),
            })
        });

        let use_case = PublishReviewUseCase::new(
            Arc::new(provider_with(
                accepting_writer(),
                Some(signer_returning("https://signed.example.com/r.html")),
            )),
            Arc::new(notifier),
        );
        let publish = PublishConfig::new("gs://reviews/r.html")
            .with_webhook_url(Some("https://hooks.example.com/x".to_string()));

        let report = use_case
            .execute(&RunContext::new(), &review_config(), &publish, "# Review")
            .await
            .unwrap();

        assert!(matches!(report.notification, NotificationOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_blank_webhook_skips_notification() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(0);

        let use_case = PublishReviewUseCase::new(
            Arc::new(provider_with(
                accepting_writer(),
                Some(signer_returning("https://signed.example.com/r.html")),
            )),
            Arc::new(notifier),
        );
        let publish = PublishConfig::new("gs://reviews/r.html").with_webhook_url(Some("   ".to_string()));

        let report = use_case
            .execute(&RunContext::new(), &review_config(), &publish, "# Review")
            .await
            .unwrap();

        assert_eq!(report.notification, NotificationOutcome::NotConfigured);
        assert_eq!(
            report.public_url.as_deref(),
            Some("https://signed.example.com/r.html")
        );
    }

    #[tokio::test]
    async fn test_interruption_after_write_skips_resolve_and_notify() {
        let ctx = RunContext::new();
        let cancel_ctx = ctx.clone();

        let mut writer = MockStorageWriter::new();
        writer.expect_write().times(1).returning(move |_, _, _, _| {
            cancel_ctx.cancel();
            Ok(())
        });
        let mut signer = MockUrlSigner::new();
        signer.expect_signed_url().times(0);
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(0);

        let use_case =
            PublishReviewUseCase::new(Arc::new(provider_with(writer, Some(signer))), Arc::new(notifier));
        let publish = PublishConfig::new("gs://reviews/r.html")
            .with_webhook_url(Some("https://hooks.example.com/x".to_string()));

        let report = use_case
            .execute(&ctx, &review_config(), &publish, "# Review")
            .await
            .unwrap();

        assert_eq!(report.public_url, None);
        assert_eq!(report.notification, NotificationOutcome::Interrupted);
    }
}
