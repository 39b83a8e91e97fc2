use crate::common::context::{Interrupted, RunContext};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error};

/// Process runner errors
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Command `{command}` failed with exit code {exit_code}:\n{output}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("Failed to launch `{command}`: {source}")]
    LaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` interrupted: {reason}")]
    Interrupted {
        command: String,
        reason: Interrupted,
    },
}

impl ProcessError {
    /// Captured output of a command that ran and exited non-zero
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Exit code of a command that ran and exited non-zero
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Whether the command ran and reported failure, as opposed to never
    /// running or being interrupted
    pub fn is_exit_failure(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }
}

/// A fully described external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute, resolved through `PATH`
    pub program: String,

    /// Arguments passed verbatim (never through a shell)
    pub args: Vec<String>,

    /// Working directory for the child
    pub working_directory: Option<PathBuf>,

    /// Variables added on top of the inherited environment
    pub environment_variables: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Create a new invocation of `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_directory: None,
            environment_variables: BTreeMap::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set working directory
    pub fn with_working_directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_directory = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add environment variable
    pub fn with_environment_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment_variables.insert(key.into(), value.into());
        self
    }

    /// Add multiple environment variables
    pub fn with_environment_variables<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment_variables
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Human-readable rendering used in logs and error messages
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// The process boundary: run a command, get its text back.
///
/// A native implementation of the same operations can replace the subprocess
/// one without touching callers.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `spec` to completion under `ctx`.
    ///
    /// Returns the combined stdout and stderr, trimmed. A non-zero exit is
    /// reported as [`ProcessError::CommandFailed`] with the same output attached.
    async fn run(&self, ctx: &RunContext, spec: &CommandSpec) -> Result<String, ProcessError>;
}

/// [`ProcessRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn build_command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);

        if let Some(working_dir) = &spec.working_directory {
            cmd.current_dir(working_dir);
        }

        cmd.envs(&spec.environment_variables);

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// Join stdout and stderr into one trimmed blob
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);

    let stdout = stdout.trim();
    let stderr = stderr.trim();
    match (stdout.is_empty(), stderr.is_empty()) {
        (true, _) => stderr.to_string(),
        (false, true) => stdout.to_string(),
        (false, false) => format!("{stdout}\n{stderr}"),
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, ctx: &RunContext, spec: &CommandSpec) -> Result<String, ProcessError> {
        let command = spec.display();
        debug!(
            command = %command,
            dir = ?spec.working_directory,
            "Running command"
        );

        let child = Self::build_command(spec)
            .spawn()
            .map_err(|source| {
                error!(command = %command, error = %source, "Failed to launch command");
                ProcessError::LaunchFailed {
                    command: command.clone(),
                    source,
                }
            })?;

        // Dropping the wait future on interruption drops the child, and
        // kill_on_drop terminates it.
        let output = ctx
            .run(child.wait_with_output())
            .await
            .map_err(|reason| ProcessError::Interrupted {
                command: command.clone(),
                reason,
            })?
            .map_err(|source| ProcessError::LaunchFailed {
                command: command.clone(),
                source,
            })?;

        let combined = combine_output(&output.stdout, &output.stderr);

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            error!(
                command = %command,
                exit_code,
                output = %combined,
                "Command failed"
            );
            return Err(ProcessError::CommandFailed {
                command,
                exit_code,
                output: combined,
            });
        }

        debug!(command = %command, "Command succeeded");
        Ok(combined)
    }
}
