use super::scm_interface::{BranchSide, GitError, GitService};
use crate::common::context::RunContext;
use crate::domain::entities::{DiffResult, RepositoryHandle, RepositoryState};
use crate::infrastructure::process::{
    ssh_command, CommandSpec, ProcessError, ProcessRunner, TokioProcessRunner, GIT_SSH_COMMAND,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Lines of context in review diffs; wider than git's default of 3
pub const DIFF_CONTEXT_LINES: u32 = 10;

const GIT: &str = "git";
const REMOTE: &str = "origin";

/// [`GitService`] that drives the local `git` binary
pub struct LocalGitAdapter {
    handle: RepositoryHandle,
    runner: Arc<dyn ProcessRunner>,
}

impl LocalGitAdapter {
    /// Create an adapter that runs `git` through `tokio::process`
    pub fn new(handle: RepositoryHandle) -> Self {
        Self::with_runner(handle, Arc::new(TokioProcessRunner::new()))
    }

    /// Create an adapter on top of a custom process runner
    pub fn with_runner(handle: RepositoryHandle, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            handle,
            runner,
        }
    }

    pub fn handle(&self) -> &RepositoryHandle {
        &self.handle
    }

    /// `GIT_SSH_COMMAND` for key-authenticated remotes
    fn ssh_environment(&self) -> Option<(String, String)> {
        let key_path = self.handle.ssh_key_path.as_ref()?;
        let command = ssh_command(key_path, self.handle.skip_host_key_check);
        debug!(cmd = %command, "Built GIT_SSH_COMMAND");
        Some((GIT_SSH_COMMAND.to_string(), command))
    }

    /// A git invocation carrying the adapter's ssh environment
    fn git_command<I, S>(&self, args: I, working_dir: &Path) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = CommandSpec::new(GIT)
            .args(args)
            .with_working_directory(working_dir);

        match self.ssh_environment() {
            Some((key, value)) => spec.with_environment_variable(key, value),
            None => spec,
        }
    }

    /// Run git inside the clone
    async fn run_git(&self, ctx: &RunContext, args: &[&str]) -> Result<String, ProcessError> {
        let spec = self.git_command(args.iter().copied(), &self.handle.local_path);
        self.runner.run(ctx, &spec).await
    }

    async fn verify_ref(
        &self,
        ctx: &RunContext,
        side: BranchSide,
        reference: &str,
    ) -> Result<(), GitError> {
        self.run_git(ctx, &["rev-parse", "--verify", reference])
            .await
            .map(|_| ())
            .map_err(|source| GitError::RefResolutionFailed {
                side,
                reference: reference.to_string(),
                source,
            })
    }

    async fn clone_repository(&self, ctx: &RunContext) -> Result<(), GitError> {
        let local_path = &self.handle.local_path;
        let url = &self.handle.remote_url;

        let repo_dir = local_path
            .file_name()
            .ok_or_else(|| GitError::InvalidLocalPath {
                path: local_path.clone(),
                reason: "path has no final directory name".to_string(),
            })?
            .to_string_lossy()
            .into_owned();

        let parent_dir = match local_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        info!(
            url = %url,
            path = %local_path.display(),
            branch = %self.handle.base_branch,
            "Repository not present locally, cloning"
        );

        if !parent_dir.exists() {
            create_parent_dirs(&parent_dir).await?;
        }

        // "--" keeps a remote URL that starts with "-" from being read as an option
        let spec = self.git_command(
            ["clone", "--", url.as_str(), repo_dir.as_str()],
            &parent_dir,
        );
        self.runner
            .run(ctx, &spec)
            .await
            .map_err(|source| GitError::CloneFailed {
                url: url.clone(),
                source,
            })?;

        info!(path = %local_path.display(), "Repository cloned");
        Ok(())
    }
}

/// Create `path` and its missing ancestors as rwxr-xr-x
async fn create_parent_dirs(path: &Path) -> Result<(), GitError> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);

    builder
        .create(path)
        .await
        .map_err(|source| GitError::CreateParentFailed {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl GitService for LocalGitAdapter {
    async fn clone_or_update(&self, ctx: &RunContext) -> Result<RepositoryState, GitError> {
        let local_path = &self.handle.local_path;
        let state = self
            .handle
            .state()
            .map_err(|source| GitError::InspectFailed {
                path: local_path.clone(),
                source,
            })?;

        match state {
            RepositoryState::PresentGitRepo => {
                info!(
                    path = %local_path.display(),
                    "Opened existing repository; update is left to fetch"
                );
            }
            RepositoryState::PresentNotAGitRepo => {
                return Err(if local_path.is_dir() {
                    GitError::NotARepository {
                        path: local_path.clone(),
                    }
                } else {
                    GitError::NotADirectory {
                        path: local_path.clone(),
                    }
                });
            }
            RepositoryState::Absent => self.clone_repository(ctx).await?,
        }

        Ok(state)
    }

    async fn fetch(&self, ctx: &RunContext) -> Result<(), GitError> {
        self.run_git(ctx, &["fetch", REMOTE, "--prune"])
            .await
            .map_err(|source| GitError::FetchFailed { source })?;
        Ok(())
    }

    async fn code_diff(
        &self,
        ctx: &RunContext,
        base_branch: &str,
        feature_branch: &str,
    ) -> Result<DiffResult, GitError> {
        let base_ref = format!("{REMOTE}/{base_branch}");
        let feature_ref = format!("{REMOTE}/{feature_branch}");

        self.verify_ref(ctx, BranchSide::Base, &base_ref).await?;
        self.verify_ref(ctx, BranchSide::Feature, &feature_ref).await?;

        // Three dots: changes on feature since its merge base with base
        let range = format!("{base_ref}...{feature_ref}");
        let unified = format!("--unified={DIFF_CONTEXT_LINES}");

        let diff = self
            .run_git(ctx, &["diff", &range, &unified])
            .await
            .map_err(|source| GitError::DiffFailed {
                range: range.clone(),
                source,
            })?;

        debug!(range = %range, bytes = diff.len(), "Computed diff");
        Ok(DiffResult::new(diff))
    }

    async fn check_remote_branch_exists(
        &self,
        ctx: &RunContext,
        branch: &str,
    ) -> Result<bool, GitError> {
        if branch.trim().is_empty() {
            return Err(GitError::EmptyBranchName);
        }

        let reference = format!("{REMOTE}/{branch}");

        // With --quiet, an unresolvable name exits 1 silently; a broken
        // repository or git itself failing exits with something else.
        match self
            .run_git(ctx, &["rev-parse", "--verify", "--quiet", &reference])
            .await
        {
            Ok(_) => Ok(true),
            Err(ProcessError::CommandFailed { exit_code: 1, .. }) => {
                debug!(reference = %reference, "Remote branch does not exist");
                Ok(false)
            }
            Err(source) => Err(GitError::BranchCheckFailed { reference, source }),
        }
    }

    async fn cleanup(&self, ctx: &RunContext) -> Result<(), GitError> {
        let base_branch = self.handle.base_branch.as_str();
        let base_ref = format!("{REMOTE}/{base_branch}");

        info!(
            path = %self.handle.local_path.display(),
            "Cleanup: fetch -> checkout -B -> clean"
        );

        self.run_git(ctx, &["fetch", REMOTE])
            .await
            .map_err(|source| GitError::CleanupFailed {
                step: "fetch",
                source,
            })?;

        self.run_git(ctx, &["checkout", "-B", base_branch, &base_ref])
            .await
            .map_err(|source| GitError::CleanupFailed {
                step: "checkout",
                source,
            })?;

        self.run_git(ctx, &["clean", "-f", "-d"])
            .await
            .map_err(|source| GitError::CleanupFailed {
                step: "clean",
                source,
            })?;

        info!(branch = %base_branch, "Cleanup: clone is clean at the remote base branch");
        Ok(())
    }
}
