use super::notifier_interface::{NotificationMessage, Notifier, NotifyError};
use crate::common::context::RunContext;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default timeout for one webhook request
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// Slack caps header text at 150 characters
const MAX_HEADER_CHARS: usize = 150;

#[derive(Debug, Serialize)]
struct SlackPayload<'a> {
    text: String,
    blocks: Vec<SlackBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SlackBlock<'a> {
    Header { text: SlackText<'a> },
    Section { text: SlackText<'a> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SlackText<'a> {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: &'a str },
}

impl<'a> SlackPayload<'a> {
    fn from_message(message: &'a NotificationMessage) -> Self {
        let header: String = message.title.chars().take(MAX_HEADER_CHARS).collect();
        Self {
            // Fallback for clients that do not render blocks
            text: format!("{}\n{}", message.title, message.body),
            blocks: vec![
                SlackBlock::Header {
                    text: SlackText::PlainText {
                        text: header,
                        emoji: true,
                    },
                },
                SlackBlock::Section {
                    text: SlackText::Mrkdwn {
                        text: &message.body,
                    },
                },
            ],
        }
    }
}

/// [`Notifier`] for Slack incoming webhooks
#[derive(Debug, Clone)]
pub struct SlackWebhookNotifier {
    timeout: Duration,
}

impl Default for SlackWebhookNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SlackWebhookNotifier {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Notifier for SlackWebhookNotifier {
    async fn send(
        &self,
        ctx: &RunContext,
        webhook_url: &str,
        message: &NotificationMessage,
    ) -> Result<(), NotifyError> {
        let url = Url::parse(webhook_url.trim())
            .map_err(|source| NotifyError::InvalidWebhookUrl { source })?;

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|source| NotifyError::ClientInit {
                source: source.without_url(),
            })?;

        // The webhook URL is a credential; only the host is logged
        debug!(host = url.host_str().unwrap_or(""), "Posting webhook notification");

        let payload = SlackPayload::from_message(message);
        let response = ctx
            .run(client.post(url).json(&payload).send())
            .await?
            // reqwest errors embed the full request URL, token included
            .map_err(|source| NotifyError::Transport {
                source: source.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match ctx.run(response.text()).await {
                Ok(Ok(body)) => body,
                _ => String::new(),
            };
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Webhook notification delivered");
        Ok(())
    }
}
