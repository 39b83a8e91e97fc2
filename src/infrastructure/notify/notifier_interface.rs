use crate::common::context::{Interrupted, RunContext};
use crate::domain::entities::ReviewConfig;
use crate::domain::value_objects::repository_path;
use async_trait::async_trait;
use thiserror::Error;

/// Notification errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid webhook URL: {source}")]
    InvalidWebhookUrl {
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to initialize HTTP client: {source}")]
    ClientInit {
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to deliver notification: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("Webhook rejected notification with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notification interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

/// A titled, multi-line chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
}

impl NotificationMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Announcement of an uploaded review.
    ///
    /// The link shows `storage_uri` as its label and opens `public_url`.
    pub fn review_uploaded(public_url: &str, storage_uri: &str, config: &ReviewConfig) -> Self {
        let body = format!(
            "*URL:* <{public_url}|{storage_uri}>\n\
             *Repository:* `{}`\n\
             *Branch:* `{}` ← `{}`\n\
             *Mode:* `{}`\n\
             *Model:* `{}`",
            repository_path(&config.repo_url),
            config.base_branch,
            config.feature_branch,
            config.review_mode,
            config.model,
        );

        Self::new("✅ AI code review result uploaded", body.trim())
    }
}

/// Posts messages to a chat webhook
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        ctx: &RunContext,
        webhook_url: &str,
        message: &NotificationMessage,
    ) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ReviewMode;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_review_uploaded_message() {
        let config = ReviewConfig {
            review_mode: ReviewMode::Release,
            model: "gemini-2.5-flash".to_string(),
            repo_url: "git@github.com:example/service.git".to_string(),
            base_branch: "main".to_string(),
            feature_branch: "feature/login".to_string(),
            ssh_key_path: None,
            local_path: PathBuf::from("reviewerRepos/service"),
            skip_host_key_check: false,
        };

        let message = NotificationMessage::review_uploaded(
            "https://signed.example.com/r.html?sig=1",
            "gs://reviews/r.html",
            &config,
        );

        assert_eq!(message.title, "✅ AI code review result uploaded");
        assert_eq!(
            message.body,
            "*URL:* <https://signed.example.com/r.html?sig=1|gs://reviews/r.html>\n\
             *Repository:* `example/service`\n\
             *Branch:* `main` ← `feature/login`\n\
             *Mode:* `release`\n\
             *Model:* `gemini-2.5-flash`"
        );
    }
}
