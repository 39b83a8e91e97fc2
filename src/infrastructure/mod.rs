/// Infrastructure layer modules
///
/// Concrete implementations for external system interactions:
/// - Process execution (the git binary)
/// - Git synchronization of a local clone
/// - Object storage (GCS, S3) and HTML rendering
/// - Chat webhook notifications
pub mod notify;
pub mod process;
pub mod scm;
pub mod storage;

// Re-export commonly used types
pub use notify::{Notifier, SlackWebhookNotifier};
pub use process::{ProcessRunner, TokioProcessRunner};
pub use scm::{GitService, LocalGitAdapter};
pub use storage::{StorageFactory, StorageProvider};
