// src/system/executor.rs

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command as StdCommand, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::models::ExecOutput;

/// Conventional exit code reported when a command is force-terminated at its
/// deadline.
const TIMEOUT_EXIT_CODE: i32 = 124;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be spawned: {1}")]
    SpawnFailed(String, #[source] std::io::Error),
    #[error("Lost track of running command '{0}': {1}")]
    WaitFailed(String, #[source] std::io::Error),
}

/// Runs a command line through the platform shell in `cwd`, capturing both
/// output streams.
///
/// This function blocks until the command finishes or the timeout expires.
/// A command that spawned but exited non-zero (or was force-terminated at
/// the deadline) is an `Ok` result carrying the failure in `exit_code` and
/// `error_message`; only a command that could not be spawned at all is an
/// `Err`.
pub fn run_shell_command(
    command_line: &str,
    cwd: &Path,
    timeout: Duration,
) -> Result<ExecOutput, ExecutionError> {
    let trimmed = command_line.trim();
    if trimmed.is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }

    let mut command = if cfg!(target_os = "windows") {
        let mut c = StdCommand::new("cmd");
        c.arg("/C").arg(trimmed);
        c
    } else {
        let mut c = StdCommand::new("sh");
        c.arg("-c").arg(trimmed);
        c
    };
    command.current_dir(dunce::simplified(cwd));

    run_command(&mut command, trimmed, timeout)
}

/// Runs an already-assembled `Command` (argument vector, no shell) with the
/// same capture and timeout behavior as [`run_shell_command`]. Used by the
/// connectivity probes, which must never pass user input through a shell.
pub fn run_command(
    command: &mut StdCommand,
    display: &str,
    timeout: Duration,
) -> Result<ExecOutput, ExecutionError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .map_err(|e| ExecutionError::SpawnFailed(display.to_string(), e))?;

    wait_with_deadline(display, &mut child, timeout)
}

/// Polls the child until it exits or the deadline passes, draining its output
/// pipes on background threads so a chatty command cannot deadlock on a full
/// pipe buffer.
fn wait_with_deadline(
    display: &str,
    child: &mut Child,
    timeout: Duration,
) -> Result<ExecOutput, ExecutionError> {
    let stdout_handle = child.stdout.take().map(spawn_reader);
    let stderr_handle = child.stderr.take().map(spawn_reader);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    log::warn!(
                        "Command '{}' exceeded its {}s budget; terminating it.",
                        display,
                        timeout.as_secs()
                    );
                    if let Err(e) = child.kill() {
                        log::warn!("Failed to kill timed-out process {}: {e}", child.id());
                    }
                    child.wait().ok();
                    break None;
                }
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => return Err(ExecutionError::WaitFailed(display.to_string(), e)),
        }
    };

    let stdout = join_reader(stdout_handle);
    let stderr = join_reader(stderr_handle);

    match status {
        Some(status) => {
            // A termination by signal has no code; report it as a failure.
            let exit_code = status.code().unwrap_or(-1);
            Ok(ExecOutput {
                stdout,
                stderr,
                exit_code,
                error_message: if exit_code == 0 {
                    None
                } else {
                    Some(format!("Command exited with code {exit_code}"))
                },
            })
        }
        None => Ok(ExecOutput {
            stdout,
            stderr,
            exit_code: TIMEOUT_EXIT_CODE,
            error_message: Some(format!(
                "Command timed out after {}s and was terminated",
                timeout.as_secs()
            )),
        }),
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = source.read_to_end(&mut buf) {
            log::debug!("Output capture ended early: {e}");
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

// MARK: --- UNIT TESTS ---
