//! Shared fixtures for the integration tests
//!
//! Repositories are built with the real `git` binary: a bare remote plus a
//! seed work tree used to push commits to it.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use gitreview::domain::entities::{ReviewConfig, ReviewMode};

/// Whether a usable `git` is on `PATH`
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run git in `dir` with a fixed identity and no system configuration
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Review Bot",
            "-c",
            "user.email=review-bot@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "init.defaultBranch=main",
        ])
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("failed to spawn git");

    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// A bare remote with a `main` branch, plus the work tree that feeds it
pub struct RemoteFixture {
    pub temp: TempDir,
    pub remote: PathBuf,
    pub seed: PathBuf,
}

impl RemoteFixture {
    /// Remote whose `main` holds a single README commit
    pub fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let remote = temp.path().join("remote.git");
        let seed = temp.path().join("seed");

        git(temp.path(), &["init", "--bare", "remote.git"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        git(temp.path(), &["init", "seed"]);
        git(&seed, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        let remote_str = remote.to_string_lossy().into_owned();
        git(&seed, &["remote", "add", "origin", &remote_str]);

        let fixture = Self { temp, remote, seed };
        fixture.commit("README.md", "# Service\n", "Initial commit");
        fixture.push("main");
        fixture
    }

    pub fn remote_url(&self) -> String {
        self.remote.to_string_lossy().into_owned()
    }

    /// Write `file` in the seed tree and commit it on the current branch
    pub fn commit(&self, file: &str, content: &str, message: &str) {
        let path = self.seed.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create dirs");
        }
        std::fs::write(&path, content).expect("failed to write file");
        git(&self.seed, &["add", file]);
        git(&self.seed, &["commit", "-m", message]);
    }

    pub fn checkout(&self, branch: &str) {
        git(&self.seed, &["checkout", branch]);
    }

    /// Create `branch` from `from` and switch to it
    pub fn branch(&self, branch: &str, from: &str) {
        git(&self.seed, &["checkout", "-b", branch, from]);
    }

    pub fn push(&self, branch: &str) {
        git(&self.seed, &["push", "origin", branch]);
    }

    /// Remote with `feature/x` adding a file, while `main` moved on separately
    pub fn with_diverged_feature() -> Self {
        let fixture = Self::new();

        fixture.branch("feature/x", "main");
        fixture.commit("src/feature.rs", "pub fn feature() {}\n", "Add feature");
        fixture.push("feature/x");

        fixture.checkout("main");
        fixture.commit("MAIN_ONLY.md", "main moved on\n", "Advance main");
        fixture.push("main");

        fixture
    }

    /// Where a test clone should live, under a nested, not yet existing dir
    pub fn clone_path(&self) -> PathBuf {
        self.temp.path().join("clones").join("nested").join("service")
    }

    pub fn review_config(&self, feature_branch: &str) -> ReviewConfig {
        ReviewConfig {
            review_mode: ReviewMode::Detail,
            model: "gemini-2.5-flash".to_string(),
            repo_url: self.remote_url(),
            base_branch: "main".to_string(),
            feature_branch: feature_branch.to_string(),
            ssh_key_path: None,
            local_path: self.clone_path(),
            skip_host_key_check: false,
        }
    }
}
