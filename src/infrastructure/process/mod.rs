pub mod command_runner;
pub mod shell;

pub use command_runner::{CommandSpec, ProcessError, ProcessRunner, TokioProcessRunner};
pub use shell::{quote_for_shell, ssh_command, GIT_SSH_COMMAND};
