//! Git synchronization against a local clone

pub mod git_scm;
pub mod scm_interface;

pub use git_scm::{LocalGitAdapter, DIFF_CONTEXT_LINES};
pub use scm_interface::{BranchSide, GitError, GitService};
