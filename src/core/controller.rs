// src/core/controller.rs

//! # Execution Controller
//!
//! A small state machine per command invocation:
//! `Idle → (MissingVars | AwaitingConfirmation | DryPreview | Running) → Idle`.
//!
//! The controller checks for missing required variables, gates destructive
//! commands behind explicit confirmation (at most one pending confirmation,
//! last request wins), branches into a dry-run preview or a live run, and
//! appends to the bounded execution history. The session-scoped execution
//! log is append-only and clearable; it is never persisted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;

use crate::constants::{COMMAND_TIMEOUT_SECS, HISTORY_VIEW_CAP, NOTIFY_THRESHOLD_MS};
use crate::core::resolver;
use crate::core::store::ConfigStore;
use crate::models::{
    CommandSpec, ExecOutcome, ExecOutput, HistoryEntry, HostOs, LogKind, LogLine,
};
use crate::system::{executor, notifier};

/// The narrow contract to the process-execution backend: run this string in
/// this directory, come back with stdout/stderr/exit code. `Err` means the
/// process could not be spawned at all, which is distinct from a command
/// that ran and exited non-zero.
pub trait ProcessRunner {
    fn run(&self, command: &str, cwd: &Path, timeout: Duration) -> Result<ExecOutput, String>;
}

/// Production runner backed by the platform shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl ProcessRunner for ShellRunner {
    fn run(&self, command: &str, cwd: &Path, timeout: Duration) -> Result<ExecOutput, String> {
        executor::run_shell_command(command, cwd, timeout).map_err(|e| e.to_string())
    }
}

/// A destructive invocation parked until the caller confirms or cancels.
#[derive(Debug, Clone)]
struct PendingInvocation {
    spec: CommandSpec,
    group: String,
    project: Option<String>,
    inputs: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct ExecutionController<'a, R: ProcessRunner> {
    store: &'a ConfigStore,
    runner: R,
    os: HostOs,
    log: Vec<LogLine>,
    pending: Option<PendingInvocation>,
}

impl<'a, R: ProcessRunner> ExecutionController<'a, R> {
    pub fn new(store: &'a ConfigStore, runner: R) -> Self {
        Self {
            store,
            runner,
            os: HostOs::detect(),
            log: Vec::new(),
            pending: None,
        }
    }

    // --- Invocation entry points ---

    /// One invocation of `spec` for an optional project scope. `group` is the
    /// owning catalog category; together with the label it keys the inline
    /// inputs.
    pub fn execute(
        &mut self,
        spec: &CommandSpec,
        group: &str,
        project: Option<&str>,
        inputs: &BTreeMap<String, String>,
    ) -> ExecOutcome {
        self.execute_inner(spec, group, project, inputs, false)
    }

    /// The destructive command currently awaiting confirmation, if any.
    pub fn pending(&self) -> Option<&CommandSpec> {
        self.pending.as_ref().map(|p| &p.spec)
    }

    /// Discards the pending destructive command.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Re-invokes the pending destructive command with confirmation granted.
    /// Returns `None` when nothing was pending.
    pub fn confirm_pending(&mut self) -> Option<ExecOutcome> {
        let pending = self.pending.take()?;
        Some(self.execute_inner(
            &pending.spec,
            &pending.group,
            pending.project.as_deref(),
            &pending.inputs,
            true,
        ))
    }

    /// Re-runs an already-resolved history command. A history line is plain
    /// resolved text, so it goes through the normal path as a non-destructive
    /// command with nothing left to substitute.
    pub fn run_from_history(&mut self, resolved_cmd: &str, project: Option<&str>) -> ExecOutcome {
        let spec = CommandSpec {
            label: "History".to_string(),
            cmd: resolved_cmd.to_string(),
            desc: String::new(),
            vars: Vec::new(),
            danger: false,
            input: None,
        };
        self.execute(&spec, "History", project, &BTreeMap::new())
    }

    /// Resolves a template against the effective variables without running
    /// anything (the copy-to-clipboard convenience).
    pub fn resolve_preview(&self, template: &str, project: Option<&str>) -> String {
        let vars = self.store.resolved_vars(project);
        resolver::resolve_template(template, &vars)
    }

    // --- Execution log ---

    pub fn log(&self) -> &[LogLine] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// The bounded in-memory view of the persisted history.
    pub fn recent_history(&self) -> Vec<HistoryEntry> {
        self.store
            .read()
            .history
            .into_iter()
            .take(HISTORY_VIEW_CAP)
            .collect()
    }

    // --- State machine ---

    fn execute_inner(
        &mut self,
        spec: &CommandSpec,
        group: &str,
        project: Option<&str>,
        inputs: &BTreeMap<String, String>,
        confirmed: bool,
    ) -> ExecOutcome {
        let vars = self.store.resolved_vars(project);

        // Missing required variables redirect to configuration; nothing runs.
        let missing = resolver::missing_required_vars(&spec.vars, &vars);
        if !missing.is_empty() {
            log::debug!("Command '{}' blocked on missing vars: {:?}", spec.label, missing);
            return ExecOutcome::MissingVars(missing);
        }

        // Destructive commands park here until confirmed. A newer request
        // replaces an older pending one; any invocation that proceeds past
        // the gate clears it.
        if spec.danger && !confirmed {
            self.pending = Some(PendingInvocation {
                spec: spec.clone(),
                group: group.to_string(),
                project: project.map(str::to_string),
                inputs: inputs.clone(),
            });
            return ExecOutcome::AwaitingConfirmation;
        }
        self.pending = None;

        let key = resolver::input_key(group, &spec.label);
        let with_inputs = resolver::resolve_inline_inputs(&spec.cmd, inputs, &key);
        let resolved = resolver::resolve_template(&with_inputs, &vars);

        if self.store.read().ui.dry_run {
            let ts = now_display();
            self.push_log(LogKind::Command, format!("[DRY RUN] $ {resolved}"), &ts);
            self.push_log(LogKind::Info, "Not executed (dry-run mode active)", &ts);
            self.push_divider(&ts);
            return ExecOutcome::DryPreview { resolved };
        }

        let cwd: PathBuf = project
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let ts = now_display();
        self.push_log(LogKind::Command, format!("$ {resolved}"), &ts);
        self.push_log(LogKind::Info, format!("Running on {}...", self.os), &ts);

        let started = Instant::now();
        let timeout = Duration::from_secs(COMMAND_TIMEOUT_SECS);
        match self.runner.run(&resolved, &cwd, timeout) {
            Ok(output) => {
                let elapsed_ms = started.elapsed().as_millis();
                self.log_output(&output);

                // Exactly one history entry per real, spawned execution;
                // a non-zero exit is still a result worth remembering.
                self.store.push_history(HistoryEntry {
                    cmd: resolved.clone(),
                    timestamp: Local::now().to_rfc3339(),
                    os: self.os,
                });

                if elapsed_ms > NOTIFY_THRESHOLD_MS {
                    let (title, verdict) = if output.success() {
                        ("CommandDock ✓", "completed")
                    } else {
                        ("CommandDock ✗", "failed")
                    };
                    notifier::notify(
                        title,
                        &format!("{}: {} (exit {})", truncated(&resolved, 50), verdict, output.exit_code),
                    );
                }

                ExecOutcome::Completed {
                    resolved,
                    exit_code: output.exit_code,
                    elapsed_ms,
                }
            }
            Err(message) => {
                let ts = now_display();
                self.push_log(LogKind::Error, format!("✗ {message}"), &ts);
                self.push_divider(&ts);
                ExecOutcome::SpawnFailed { resolved, message }
            }
        }
    }

    fn log_output(&mut self, output: &ExecOutput) {
        let ts = now_display();
        let stdout_lines: Vec<String> = output
            .stdout
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        for line in stdout_lines {
            self.push_log(LogKind::Output, line, &ts);
        }
        let stderr_lines: Vec<String> = output
            .stderr
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        for line in stderr_lines {
            self.push_log(LogKind::Error, line, &ts);
        }
        if output.success() {
            self.push_log(LogKind::Success, "✓ Completed (exit 0)", &ts);
        } else {
            self.push_log(LogKind::Error, format!("✗ Exit code: {}", output.exit_code), &ts);
        }
        self.push_divider(&ts);
    }

    fn push_log(&mut self, kind: LogKind, text: impl Into<String>, time: &str) {
        self.log.push(LogLine {
            kind,
            text: text.into(),
            time: time.to_string(),
        });
    }

    fn push_divider(&mut self, time: &str) {
        self.push_log(LogKind::Divider, "─".repeat(50), time);
    }
}

fn now_display() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

fn truncated(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    #[derive(Clone)]
    struct MockRunner {
        calls: Rc<RefCell<Vec<String>>>,
        result: Result<ExecOutput, String>,
    }

    impl MockRunner {
        fn ok(output: ExecOutput) -> Self {
            Self {
                calls: Rc::new(RefCell::new(Vec::new())),
                result: Ok(output),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: Rc::new(RefCell::new(Vec::new())),
                result: Err(message.to_string()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ProcessRunner for MockRunner {
        fn run(&self, command: &str, _cwd: &Path, _timeout: Duration) -> Result<ExecOutput, String> {
            self.calls.borrow_mut().push(command.to_string());
            self.result.clone()
        }
    }

    fn ok_output() -> ExecOutput {
        ExecOutput {
            stdout: "done\n".to_string(),
            stderr: String::new(),
            exit_code: 0,
            error_message: None,
        }
    }

    fn plain_spec(cmd: &str) -> CommandSpec {
        CommandSpec {
            label: "Test".to_string(),
            cmd: cmd.to_string(),
            desc: String::new(),
            vars: Vec::new(),
            danger: false,
            input: None,
        }
    }

    fn store_in(dir: &Path) -> ConfigStore {
        ConfigStore::new(dir.join("config.json"))
    }

    #[test]
    fn missing_required_vars_block_without_running() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let runner = MockRunner::ok(ok_output());
        let mut controller = ExecutionController::new(&store, runner.clone());

        let spec = CommandSpec {
            vars: vec!["ssh_user".to_string(), "ssh_host".to_string()],
            ..plain_spec("ssh {{ssh_user}}@{{ssh_host}}")
        };
        let outcome = controller.execute(&spec, "Tailscale Remote", None, &BTreeMap::new());

        assert_eq!(
            outcome,
            ExecOutcome::MissingVars(vec!["ssh_user".to_string(), "ssh_host".to_string()])
        );
        assert!(runner.calls().is_empty());
        assert!(store.read().history.is_empty());
    }

    #[test]
    fn destructive_command_parks_until_confirmed() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let runner = MockRunner::ok(ok_output());
        let mut controller = ExecutionController::new(&store, runner.clone());

        let spec = CommandSpec {
            danger: true,
            ..plain_spec("docker compose down")
        };
        let outcome = controller.execute(&spec, "Docker", None, &BTreeMap::new());
        assert_eq!(outcome, ExecOutcome::AwaitingConfirmation);
        assert!(runner.calls().is_empty(), "nothing runs before confirmation");
        assert!(store.read().history.is_empty());
        assert!(controller.pending().is_some());

        let confirmed = controller.confirm_pending().expect("was pending");
        assert!(matches!(confirmed, ExecOutcome::Completed { exit_code: 0, .. }));
        assert_eq!(runner.calls(), vec!["docker compose down".to_string()]);
        assert_eq!(store.read().history.len(), 1);
        assert!(controller.pending().is_none());
    }

    #[test]
    fn cancel_discards_the_pending_command() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let runner = MockRunner::ok(ok_output());
        let mut controller = ExecutionController::new(&store, runner.clone());

        let spec = CommandSpec {
            danger: true,
            ..plain_spec("git reset --hard HEAD")
        };
        controller.execute(&spec, "Git", None, &BTreeMap::new());
        controller.cancel_pending();

        assert!(controller.pending().is_none());
        assert!(controller.confirm_pending().is_none());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn second_destructive_request_replaces_the_first() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let runner = MockRunner::ok(ok_output());
        let mut controller = ExecutionController::new(&store, runner.clone());

        let first = CommandSpec {
            danger: true,
            ..plain_spec("docker compose down")
        };
        let second = CommandSpec {
            danger: true,
            ..plain_spec("git reset --hard HEAD")
        };
        controller.execute(&first, "Docker", None, &BTreeMap::new());
        controller.execute(&second, "Git", None, &BTreeMap::new());

        controller.confirm_pending().expect("was pending");
        assert_eq!(runner.calls(), vec!["git reset --hard HEAD".to_string()]);
    }

    #[test]
    fn dry_run_never_spawns_and_never_touches_history() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        store.set_dry_run(true);
        let runner = MockRunner::ok(ok_output());
        let mut controller = ExecutionController::new(&store, runner.clone());

        let outcome = controller.execute(&plain_spec("git status"), "Git", None, &BTreeMap::new());

        assert_eq!(
            outcome,
            ExecOutcome::DryPreview { resolved: "git status".to_string() }
        );
        assert!(runner.calls().is_empty());
        assert!(store.read().history.is_empty());
        assert!(
            controller.log().iter().any(|l| l.text.starts_with("[DRY RUN]")),
            "preview line is appended to the execution log"
        );
    }

    #[test]
    fn live_run_resolves_vars_and_records_history() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        store.set_global_var("git_remote", "origin").expect("known var");
        store.set_project_var("/srv/app", "git_branch", "dev").expect("known var");
        let runner = MockRunner::ok(ok_output());
        let mut controller = ExecutionController::new(&store, runner.clone());

        let spec = CommandSpec {
            vars: vec!["git_remote".to_string(), "git_branch".to_string()],
            ..plain_spec("git push {{git_remote}} {{git_branch}}")
        };
        let outcome = controller.execute(&spec, "Git", Some("/srv/app"), &BTreeMap::new());

        assert!(matches!(outcome, ExecOutcome::Completed { exit_code: 0, .. }));
        assert_eq!(runner.calls(), vec!["git push origin dev".to_string()]);

        let history = store.read().history;
        assert_eq!(history.len(), 1);
        let entry = history.first().expect("one entry");
        assert_eq!(entry.cmd, "git push origin dev");
        assert!(!entry.timestamp.is_empty());
    }

    #[test]
    fn non_zero_exit_is_completed_and_recorded() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let runner = MockRunner::ok(ExecOutput {
            stdout: String::new(),
            stderr: "boom\n".to_string(),
            exit_code: 2,
            error_message: Some("Command exited with code 2".to_string()),
        });
        let mut controller = ExecutionController::new(&store, runner);

        let outcome = controller.execute(&plain_spec("false"), "Git", None, &BTreeMap::new());

        assert!(matches!(outcome, ExecOutcome::Completed { exit_code: 2, .. }));
        assert_eq!(store.read().history.len(), 1, "non-zero exits still enter history");
        assert!(
            controller
                .log()
                .iter()
                .any(|l| l.kind == LogKind::Error && l.text.contains("Exit code: 2"))
        );
    }

    #[test]
    fn spawn_failure_logs_error_and_skips_history() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let runner = MockRunner::failing("No such file or directory");
        let mut controller = ExecutionController::new(&store, runner);

        let outcome = controller.execute(&plain_spec("ghost-bin"), "Git", None, &BTreeMap::new());

        assert!(matches!(outcome, ExecOutcome::SpawnFailed { .. }));
        assert!(store.read().history.is_empty());
        assert!(controller.log().iter().any(|l| l.kind == LogKind::Error));
    }

    #[test]
    fn inline_inputs_are_bound_by_group_and_label() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let runner = MockRunner::ok(ok_output());
        let mut controller = ExecutionController::new(&store, runner.clone());

        let spec = CommandSpec {
            label: "Commit".to_string(),
            input: Some("message".to_string()),
            ..plain_spec("git commit -m \"{message}\"")
        };
        let mut inputs = BTreeMap::new();
        inputs.insert("Git-Commit-message".to_string(), "fix tokenizer".to_string());
        controller.execute(&spec, "Git", None, &inputs);

        assert_eq!(runner.calls(), vec!["git commit -m \"fix tokenizer\"".to_string()]);
    }

    #[test]
    fn run_from_history_reuses_the_resolved_string() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let runner = MockRunner::ok(ok_output());
        let mut controller = ExecutionController::new(&store, runner.clone());

        let outcome = controller.run_from_history("git push origin main", None);

        assert!(matches!(outcome, ExecOutcome::Completed { .. }));
        assert_eq!(runner.calls(), vec!["git push origin main".to_string()]);
        assert_eq!(store.read().history.len(), 1);
    }

    #[test]
    fn history_view_is_capped_below_the_persisted_cap() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        for i in 0..60 {
            store.push_history(HistoryEntry {
                cmd: format!("cmd-{i}"),
                timestamp: String::new(),
                os: HostOs::Mac,
            });
        }
        let controller = ExecutionController::new(&store, MockRunner::ok(ok_output()));

        let view = controller.recent_history();
        assert_eq!(view.len(), HISTORY_VIEW_CAP);
        assert_eq!(view.first().map(|h| h.cmd.as_str()), Some("cmd-59"));
        assert_eq!(store.read().history.len(), 60, "the store keeps its own cap");
    }

    #[test]
    fn clear_log_empties_the_session_log() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        store.set_dry_run(true);
        let mut controller = ExecutionController::new(&store, MockRunner::ok(ok_output()));

        controller.execute(&plain_spec("git status"), "Git", None, &BTreeMap::new());
        assert!(!controller.log().is_empty());
        controller.clear_log();
        assert!(controller.log().is_empty());
    }

    #[test]
    fn resolve_preview_does_not_change_state() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        store.set_global_var("git_branch", "main").expect("known var");
        let controller = ExecutionController::new(&store, MockRunner::ok(ok_output()));

        let preview = controller.resolve_preview("git checkout {{git_branch}}", None);
        assert_eq!(preview, "git checkout main");
        assert!(store.read().history.is_empty());
        assert!(controller.log().is_empty());
    }
}
