//! Quoting for values that end up inside a string a sub-shell will parse.
//!
//! git runs `GIT_SSH_COMMAND` through `sh -c`, so anything interpolated into
//! it is shell syntax. Every path-like value goes through [`quote_for_shell`]:
//! the result always tokenizes back to exactly the original value, whatever
//! quote characters or metacharacters it contains.

use std::path::Path;

/// Environment variable git consults for the ssh transport command
pub const GIT_SSH_COMMAND: &str = "GIT_SSH_COMMAND";

/// Wrap `value` in single quotes so a POSIX shell reads it as one literal word.
///
/// Inside single quotes nothing is special except the closing quote, so each
/// embedded `'` is emitted as `'\''`: close the quoted run, add an escaped
/// quote, reopen.
pub fn quote_for_shell(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Build the `ssh` invocation git should use for a key-authenticated remote.
///
/// `-F /dev/null` keeps the user's ssh config out of the picture. Host key
/// checking is only disabled when `skip_host_key_check` is set, which exposes
/// the connection to man-in-the-middle attacks and is meant for throwaway
/// environments.
pub fn ssh_command(key_path: &Path, skip_host_key_check: bool) -> String {
    let safe_key_path = quote_for_shell(&key_path.to_string_lossy());

    let mut parts = vec![
        "ssh".to_string(),
        "-i".to_string(),
        safe_key_path,
        "-F".to_string(),
        "/dev/null".to_string(),
    ];

    if skip_host_key_check {
        parts.push("-o".to_string());
        parts.push("StrictHostKeyChecking=no".to_string());
    }

    parts.join(" ")
}
