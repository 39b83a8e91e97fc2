//! # gitreview - branch diff review and publishing
//!
//! `gitreview` clones (or reuses) a repository, diffs a feature branch
//! against its base branch, produces a Markdown review of the change, and
//! optionally archives it to Google Cloud Storage or S3 and announces the
//! link on Slack.
//!
//! ## Quick Start
//!
//! Print a review to stdout:
//!
//! ```bash
//! gitreview generic -u git@github.com:example/service.git -f feature/login
//! ```
//!
//! Upload it and notify a channel:
//!
//! ```bash
//! SLACK_WEBHOOK_URL=https://hooks.slack.com/services/... \
//! gitreview publish -u git@github.com:example/service.git -f feature/login \
//!     -s gs://reviews/service/login.html
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: run configuration, repository state, storage targets
//! - [`application`]: the review pipeline and the publish orchestration
//! - [`infrastructure`]: subprocesses, git, object storage, Slack
//! - [`presentation`]: the command line
//! - [`common`]: cancellation context and error handling
//!
//! Every subprocess and network call runs under a
//! [`common::context::RunContext`], so Ctrl-C or `--timeout` stops the run
//! and kills any `git` child still in flight.
//!
//! ## Using the Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gitreview::application::services::DiffDigestReviewer;
//! use gitreview::application::use_cases::ReviewPipelineUseCase;
//! use gitreview::common::context::RunContext;
//! use gitreview::domain::entities::{RepositoryHandle, ReviewConfig, ReviewMode};
//! use gitreview::infrastructure::scm::LocalGitAdapter;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ReviewConfig {
//!     review_mode: ReviewMode::Detail,
//!     model: "gemini-2.5-flash".to_string(),
//!     repo_url: "https://github.com/example/service.git".to_string(),
//!     base_branch: "main".to_string(),
//!     feature_branch: "feature/login".to_string(),
//!     ssh_key_path: None,
//!     local_path: "reviewerRepos/service".into(),
//!     skip_host_key_check: false,
//! };
//!
//! let git = LocalGitAdapter::new(RepositoryHandle::from_config(&config));
//! let pipeline = ReviewPipelineUseCase::new(Arc::new(git), Arc::new(DiffDigestReviewer::new()));
//! let outcome = pipeline.execute(&RunContext::new(), &config).await?;
//!
//! if let Some(review) = outcome.review() {
//!     println!("{review}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::ReviewError;
pub use crate::common::result::ReviewResult as Result;
