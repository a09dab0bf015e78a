// src/system/probes.rs

//! Narrow connectivity checks. Both probes build their commands as argument
//! vectors and never pass user input through a shell; user and host are
//! additionally validated against an allow-list before any command is
//! constructed, so a malicious value cannot smuggle arguments in.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use std::process::Command as StdCommand;
use std::time::Duration;

use crate::constants::{GIT_PROBE_TIMEOUT_SECS, SSH_CONNECT_TIMEOUT_SECS, SSH_PROBE_TIMEOUT_SECS};
use crate::models::{GitIdentity, SshProbe};
use crate::system::executor;

lazy_static! {
    static ref SAFE_TOKEN: Regex = Regex::new(r"^[A-Za-z0-9_.@-]+$").unwrap();
}

/// Whether a user or host value is safe to place into a command.
pub fn is_safe_token(value: &str) -> bool {
    SAFE_TOKEN.is_match(value)
}

/// Checks whether `user@host` is reachable over SSH in batch mode.
pub fn test_ssh(user: &str, host: &str) -> SshProbe {
    if user.is_empty() || host.is_empty() {
        return SshProbe {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            error: Some("User and host are required".to_string()),
        };
    }
    if !is_safe_token(user) || !is_safe_token(host) {
        return SshProbe {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            error: Some("Invalid characters in user or host".to_string()),
        };
    }

    let target = format!("{user}@{host}");
    let mut command = StdCommand::new("ssh");
    command
        .arg("-o")
        .arg(format!("ConnectTimeout={SSH_CONNECT_TIMEOUT_SECS}"))
        .arg("-o")
        .arg("BatchMode=yes")
        .arg("-o")
        .arg("StrictHostKeyChecking=no")
        .arg(&target)
        .arg("echo")
        .arg("ok");

    match executor::run_command(
        &mut command,
        &format!("ssh {target}"),
        Duration::from_secs(SSH_PROBE_TIMEOUT_SECS),
    ) {
        Ok(output) => SshProbe {
            success: output.success() && output.stdout.contains("ok"),
            stdout: output.stdout.trim().to_string(),
            stderr: output.stderr,
            error: output.error_message,
        },
        Err(e) => {
            log::debug!("SSH probe could not run: {e}");
            SshProbe {
                success: false,
                stdout: String::new(),
                stderr: String::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

/// Reads the local git identity configured for `cwd`.
pub fn git_identity(cwd: &Path) -> GitIdentity {
    let mut command = StdCommand::new("git");
    command.arg("config").arg("user.email").current_dir(cwd);

    match executor::run_command(
        &mut command,
        "git config user.email",
        Duration::from_secs(GIT_PROBE_TIMEOUT_SECS),
    ) {
        Ok(output) => {
            let email = output.stdout.trim().to_string();
            GitIdentity {
                success: output.success() && !email.is_empty(),
                email,
                error: output.error_message,
            }
        }
        Err(e) => {
            log::debug!("Git probe could not run: {e}");
            GitIdentity {
                success: false,
                email: String::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

// MARK: --- UNIT TESTS ---
