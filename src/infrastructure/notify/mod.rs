//! Chat notifications for published reviews

pub mod notifier_interface;
pub mod slack;

pub use notifier_interface::{NotificationMessage, Notifier, NotifyError};
pub use slack::{SlackWebhookNotifier, DEFAULT_HTTP_TIMEOUT};
