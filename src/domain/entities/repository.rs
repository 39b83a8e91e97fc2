use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use super::review::ReviewConfig;

/// Local clone of one remote, as configured for a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryHandle {
    /// Where the clone lives on disk
    pub local_path: PathBuf,

    /// Remote URL cloned as `origin`
    pub remote_url: String,

    /// Branch the clone is reset to during cleanup
    pub base_branch: String,

    /// Private key handed to `ssh`, if the remote needs one
    pub ssh_key_path: Option<PathBuf>,

    /// Disable ssh host key verification (dangerous, opt-in)
    pub skip_host_key_check: bool,
}

impl RepositoryHandle {
    /// Create a handle with base branch `main` and no ssh key
    pub fn new(local_path: impl Into<PathBuf>, remote_url: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_url: remote_url.into(),
            base_branch: "main".to_string(),
            ssh_key_path: None,
            skip_host_key_check: false,
        }
    }

    /// Build a handle from the run configuration
    pub fn from_config(config: &ReviewConfig) -> Self {
        Self {
            local_path: config.local_path.clone(),
            remote_url: config.repo_url.clone(),
            base_branch: config.base_branch.clone(),
            ssh_key_path: config.ssh_key_path.clone(),
            skip_host_key_check: config.skip_host_key_check,
        }
    }

    pub fn with_base_branch(mut self, branch: impl Into<String>) -> Self {
        self.base_branch = branch.into();
        self
    }

    pub fn with_ssh_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.ssh_key_path = Some(key_path.into());
        self
    }

    pub fn with_skip_host_key_check(mut self, skip: bool) -> Self {
        self.skip_host_key_check = skip;
        self
    }

    /// Inspect the filesystem at the local path
    pub fn state(&self) -> io::Result<RepositoryState> {
        RepositoryState::detect(&self.local_path)
    }
}

/// What currently occupies a repository's local path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepositoryState {
    /// Nothing there yet: clone
    Absent,
    /// Something that is not a git work tree: never touched
    PresentNotAGitRepo,
    /// An existing clone: reuse it
    PresentGitRepo,
}

impl RepositoryState {
    /// Classify `path`.
    ///
    /// A regular file, or a directory without a `.git` entry, is
    /// [`RepositoryState::PresentNotAGitRepo`]. Errors other than "not found"
    /// are returned as-is.
    pub fn detect(path: &Path) -> io::Result<Self> {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::Absent),
            Err(e) => return Err(e),
        };

        if !metadata.is_dir() {
            return Ok(Self::PresentNotAGitRepo);
        }

        // `.git` is a directory in a normal clone and a file in worktrees
        match std::fs::symlink_metadata(path.join(".git")) {
            Ok(_) => Ok(Self::PresentGitRepo),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::PresentNotAGitRepo),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Display for RepositoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryState::Absent => write!(f, "absent"),
            RepositoryState::PresentNotAGitRepo => write!(f, "present (not a git repository)"),
            RepositoryState::PresentGitRepo => write!(f, "present (git repository)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_handle_builder() {
        let handle = RepositoryHandle::new("/tmp/repo", "git@github.com:example/repo.git")
            .with_base_branch("develop")
            .with_ssh_key("/keys/id_ed25519")
            .with_skip_host_key_check(true);

        assert_eq!(handle.base_branch, "develop");
        assert_eq!(handle.ssh_key_path, Some(PathBuf::from("/keys/id_ed25519")));
        assert!(handle.skip_host_key_check);
    }

    #[test]
    fn test_detect_absent() {
        let temp_dir = TempDir::new().unwrap();
        let state = RepositoryState::detect(&temp_dir.path().join("missing")).unwrap();
        assert_eq!(state, RepositoryState::Absent);
    }

    #[test]
    fn test_detect_plain_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();
        let state = RepositoryState::detect(temp_dir.path()).unwrap();
        assert_eq!(state, RepositoryState::PresentNotAGitRepo);
    }

    #[test]
    fn test_detect_regular_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert_eq!(
            RepositoryState::detect(&file).unwrap(),
            RepositoryState::PresentNotAGitRepo
        );
    }

    #[test]
    fn test_detect_git_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join(".git")).unwrap();
        assert_eq!(
            RepositoryState::detect(temp_dir.path()).unwrap(),
            RepositoryState::PresentGitRepo
        );
    }

    #[test]
    fn test_detect_worktree_git_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(".git"), "gitdir: /elsewhere\n").unwrap();
        assert_eq!(
            RepositoryState::detect(temp_dir.path()).unwrap(),
            RepositoryState::PresentGitRepo
        );
    }
}
