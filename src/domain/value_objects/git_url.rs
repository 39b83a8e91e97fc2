use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;
use url::Url;

/// Directory under which clones land when no local path is given
pub const DEFAULT_CLONE_ROOT: &str = "reviewerRepos";

/// scp-like remote syntax: `user@host:owner/repo.git`
fn scp_like_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<user>[^@/:]+)@(?P<host>[^:/]+):(?P<path>.+)$")
            .expect("scp-like remote pattern is valid")
    })
}

/// Rewrite an scp-like remote into an `ssh://` URL so it can be parsed.
///
/// Any other input is returned unchanged.
pub fn normalize_remote_url(remote: &str) -> String {
    let trimmed = remote.trim();
    match scp_like_pattern().captures(trimmed) {
        Some(captures) => format!(
            "ssh://{}@{}/{}",
            &captures["user"],
            &captures["host"],
            captures["path"].trim_start_matches('/')
        ),
        None => trimmed.to_string(),
    }
}

/// Extract an `owner/repo` style path from a remote URL.
///
/// Handles scp-like (`git@host:owner/repo.git`) and URL-style remotes,
/// stripping the leading `/` and a trailing `.git`. Input that cannot be
/// parsed comes back verbatim so callers can still display something.
pub fn repository_path(remote: &str) -> String {
    let normalized = normalize_remote_url(remote);

    let parsed = match Url::parse(&normalized) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(url = %remote, error = %e, "Failed to parse repository URL, using it as-is");
            return remote.to_string();
        }
    };

    let path = parsed.path().trim_start_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    path.trim_end_matches('/').to_string()
}

/// Turn a remote URL into a directory name that is unique per remote and
/// safe on every filesystem: runs of characters outside `[A-Za-z0-9._-]`
/// collapse to a single `_`.
pub fn sanitize_for_path(remote: &str) -> String {
    let mut sanitized = String::with_capacity(remote.len());
    let mut last_was_separator = false;

    for ch in remote.trim().chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-') {
            sanitized.push(ch);
            last_was_separator = false;
        } else if !last_was_separator {
            sanitized.push('_');
            last_was_separator = true;
        }
    }

    let sanitized = sanitized.trim_matches(|c| c == '_' || c == '.').to_string();
    if sanitized.is_empty() {
        "repository".to_string()
    } else {
        sanitized
    }
}

/// Default clone location for `remote` under `root`
pub fn default_local_path(remote: &str, root: &Path) -> PathBuf {
    root.join(sanitize_for_path(remote))
}
