pub mod commands;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use validator::Validate;

use crate::common::context::RunContext;
use crate::common::result::{OptionExt, ReviewResult};
use crate::domain::entities::{ReviewConfig, ReviewMode};
use crate::domain::value_objects::{default_local_path, DEFAULT_CLONE_ROOT};
use crate::infrastructure::storage::DEFAULT_CONTENT_TYPE;

use commands::{GenericCommand, PublishCommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("GITREVIEW_GIT_HASH"),
    "\nbuilt: ",
    env!("GITREVIEW_BUILD_DATE"),
    "\ntarget: ",
    env!("GITREVIEW_BUILD_TARGET"),
);

/// Exit status after Ctrl-C or `--timeout`, as a shell reports SIGINT
const EXIT_INTERRUPTED: i32 = 130;

/// Default model name recorded in reviews and notifications
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// gitreview - review the diff between two remote branches
#[derive(Parser)]
#[command(name = "gitreview")]
#[command(about = "Review the diff between two remote branches, then print or publish the result")]
#[command(version, long_version = LONG_VERSION)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Review the branch diff and print the result
    Generic {
        #[command(flatten)]
        review: ReviewArgs,
    },

    /// Review the branch diff, upload the result to GCS or S3 and notify Slack
    Publish {
        #[command(flatten)]
        review: ReviewArgs,

        #[command(flatten)]
        publish: PublishArgs,
    },
}

/// Options shared by every review command
#[derive(Args, Debug, Clone)]
pub struct ReviewArgs {
    /// Review mode: detail or release
    #[arg(short = 'm', long, default_value = "detail")]
    pub mode: ReviewMode,

    /// Remote repository URL (ssh or https)
    #[arg(short = 'u', long)]
    pub repo_url: String,

    /// Base branch of the comparison
    #[arg(short = 'b', long, default_value = "main")]
    pub base_branch: String,

    /// Feature branch to review
    #[arg(short = 'f', long)]
    pub feature_branch: String,

    /// Where to keep the clone (defaults to reviewerRepos/<sanitized repo url>)
    #[arg(short = 'l', long)]
    pub local_path: Option<PathBuf>,

    /// Model name recorded with the review
    #[arg(short = 'g', long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Private key for ssh remotes (defaults to ~/.ssh/id_rsa when present)
    #[arg(short = 'k', long)]
    pub ssh_key_path: Option<PathBuf>,

    /// Disable ssh host key verification (unsafe outside throwaway environments)
    #[arg(long)]
    pub skip_host_key_check: bool,

    /// Do not reset an existing clone to the remote base branch first
    #[arg(long)]
    pub no_cleanup: bool,

    /// Abort the whole run after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl ReviewArgs {
    /// Build the immutable run configuration, applying defaults
    pub fn to_config(&self) -> ReviewResult<ReviewConfig> {
        let local_path = match &self.local_path {
            Some(path) => expand_home(path)?,
            None => default_local_path(&self.repo_url, Path::new(DEFAULT_CLONE_ROOT)),
        };

        let ssh_key_path = match &self.ssh_key_path {
            Some(path) => Some(expand_home(path)?),
            None => default_ssh_key(),
        };

        let config = ReviewConfig {
            review_mode: self.mode,
            model: self.model.clone(),
            repo_url: self.repo_url.clone(),
            base_branch: self.base_branch.clone(),
            feature_branch: self.feature_branch.clone(),
            ssh_key_path,
            local_path,
            skip_host_key_check: self.skip_host_key_check,
        }
        .normalized();

        config.validate()?;
        Ok(config)
    }

    /// Root context for one run, bounded by `--timeout` when given
    pub fn run_context(&self) -> RunContext {
        let ctx = RunContext::new();
        match self.timeout {
            Some(secs) => ctx.with_timeout(Duration::from_secs(secs)),
            None => ctx,
        }
    }
}

/// Options for the publish command
#[derive(Args, Debug, Clone)]
pub struct PublishArgs {
    /// Destination URI: gs://<bucket>/<key> or s3://<bucket>/<key>
    #[arg(short = 's', long = "uri")]
    pub uri: String,

    /// Content-Type of the stored object
    #[arg(short = 't', long, default_value = DEFAULT_CONTENT_TYPE)]
    pub content_type: String,

    /// Slack incoming webhook; notification is skipped when unset
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub slack_webhook_url: Option<String>,

    /// Region for the S3 client and the public URL (default ap-northeast-1)
    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    /// Lifetime of signed GCS links in minutes
    #[arg(
        long,
        env = "GITREVIEW_SIGNED_URL_EXPIRY_MINUTES",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..=10080)
    )]
    pub signed_url_expiry: u64,

    /// Timeout for the webhook request in seconds
    #[arg(long, default_value_t = 30, value_name = "SECONDS")]
    pub http_timeout: u64,
}

/// Replace a leading `~` with the home directory
fn expand_home(path: &Path) -> ReviewResult<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir()
                .ok_or_config_error(format!("cannot expand '{}': home directory unknown", path.display()))?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

fn default_ssh_key() -> Option<PathBuf> {
    let key = dirs::home_dir()?.join(".ssh").join("id_rsa");
    key.is_file().then_some(key)
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "gitreview=debug"
    } else {
        "gitreview=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // stdout carries the review; logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Cancel `ctx` on Ctrl-C so running git children are killed
fn cancel_on_interrupt(ctx: &RunContext) {
    let token = ctx.token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            token.cancel();
        }
    });
}

pub struct CliApp {
    cli: Cli,
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        colored::control::set_override(!self.cli.no_color);
        init_tracing(self.cli.verbose);

        match self.handle_command().await {
            Ok(_) => Ok(()),
            Err(e) if e.is_interrupted() => {
                eprintln!("{} {}", "Interrupted:".yellow().bold(), e);
                exit(EXIT_INTERRUPTED);
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self) -> ReviewResult<()> {
        match &self.cli.command {
            Commands::Generic { review } => {
                let ctx = review.run_context();
                cancel_on_interrupt(&ctx);
                GenericCommand::new(review.to_config()?, !review.no_cleanup)
                    .execute(&ctx)
                    .await
            }
            Commands::Publish { review, publish } => {
                let ctx = review.run_context();
                cancel_on_interrupt(&ctx);
                PublishCommand::new(review.to_config()?, !review.no_cleanup, publish.clone())
                    .execute(&ctx)
                    .await
            }
        }
    }
}
