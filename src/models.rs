// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::core::schema;

// --- HOST PLATFORM ---

/// The two platforms the command catalog distinguishes between.
/// Anything that is not Windows is treated as the Unix-flavored `mac` family.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Mac,
    Windows,
}

impl HostOs {
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Mac
        }
    }
}

impl Default for HostOs {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mac => write!(f, "macOS"),
            Self::Windows => write!(f, "Windows"),
        }
    }
}

// --- PERSISTED DOCUMENT MODELS ---
// These mirror the on-disk JSON shape of ~/.commanddock/config.json.
// The migrator guarantees every field is structurally valid after load,
// so the rest of the crate never has to defend against missing containers.

/// A user-defined command template stored in a scope.
/// Entries with an empty `label` or `cmd` are dropped during validation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CustomCommand {
    pub label: String,
    pub cmd: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub vars: Vec<String>,
}

/// One executed command, immutable once appended.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// The fully resolved command text, never a template.
    pub cmd: String,
    /// ISO-8601 timestamp of the invocation.
    #[serde(default, rename = "time")]
    pub timestamp: String,
    #[serde(default)]
    pub os: HostOs,
}

/// One configuration layer: the global defaults or a per-project override set.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScopeConfig {
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    #[serde(default)]
    pub custom_commands: Vec<CustomCommand>,
    #[serde(default)]
    pub favorites: Vec<String>,
}

/// UI-facing knobs persisted with the document.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    #[serde(default)]
    pub collapsed: BTreeMap<String, bool>,
    #[serde(default)]
    pub dry_run: bool,
}

/// The persisted root document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    pub version: u32,
    #[serde(default)]
    pub setup_done: bool,
    #[serde(default)]
    pub workspace_root: String,
    #[serde(default)]
    pub recent_projects: Vec<String>,
    #[serde(default)]
    pub global: ScopeConfig,
    #[serde(default)]
    pub projects: BTreeMap<String, ScopeConfig>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub ui: UiState,
}

impl ConfigDocument {
    /// Creates the fresh default document used on first run and after `reset`.
    /// The global scope is fully populated with the variable-schema defaults;
    /// every other container starts empty.
    pub fn default_document() -> Self {
        Self {
            version: crate::constants::SCHEMA_VERSION,
            setup_done: false,
            workspace_root: String::new(),
            recent_projects: Vec::new(),
            global: ScopeConfig {
                vars: schema::default_vars(),
                custom_commands: Vec::new(),
                favorites: Vec::new(),
            },
            projects: BTreeMap::new(),
            history: Vec::new(),
            ui: UiState::default(),
        }
    }
}

/// A shallow partial update for a per-project scope. `None` fields keep the
/// existing value; `Some` fields replace it wholesale.
#[derive(Debug, Clone, Default)]
pub struct ScopePatch {
    pub vars: Option<BTreeMap<String, String>>,
    pub custom_commands: Option<Vec<CustomCommand>>,
    pub favorites: Option<Vec<String>>,
}

// --- COMMAND CATALOG MODELS ---

/// A runnable command template plus the metadata the controller needs:
/// which persisted variables it requires, whether it is destructive, and
/// whether it takes a per-invocation free-text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub label: String,
    pub cmd: String,
    pub desc: String,
    pub vars: Vec<String>,
    pub danger: bool,
    /// Name of the single-brace inline input slot (e.g. "message"), if any.
    pub input: Option<String>,
}

impl From<&CustomCommand> for CommandSpec {
    fn from(value: &CustomCommand) -> Self {
        Self {
            label: value.label.clone(),
            cmd: value.cmd.clone(),
            desc: value.desc.clone(),
            vars: value.vars.clone(),
            danger: false,
            input: None,
        }
    }
}

/// A named, colored group of command templates, keyed off a marker file
/// (e.g. `docker-compose.yml`) or supplied unconditionally (remote/system).
#[derive(Debug, Clone)]
pub struct CommandGroup {
    pub category: String,
    pub icon: &'static str,
    pub color: colored::Color,
    pub commands: Vec<CommandSpec>,
}

// --- EXECUTION MODELS ---

/// The narrow result contract of the process-execution collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub error_message: Option<String>,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Stream/severity tag for one execution-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Command,
    Info,
    Output,
    Error,
    Success,
    Divider,
}

/// One line of the session-scoped, append-only execution log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LogKind,
    pub text: String,
    pub time: String,
}

/// The single outcome produced by one controller invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Required variables are unset; nothing was run. Redirect to configuration.
    MissingVars(Vec<String>),
    /// The command is destructive and confirmation has not been granted yet.
    AwaitingConfirmation,
    /// Dry-run mode: the resolved command was logged but never spawned.
    DryPreview { resolved: String },
    /// The process ran to completion (exit 0 or not) within its budget.
    Completed {
        resolved: String,
        exit_code: i32,
        elapsed_ms: u128,
    },
    /// The process could not be spawned at all; no history was recorded.
    SpawnFailed { resolved: String, message: String },
}

// --- SCAN MODELS ---

/// One immediate subdirectory of the workspace root, with its detected stacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub name: String,
    pub path: PathBuf,
    pub stacks: Vec<&'static str>,
    pub files: Vec<String>,
}

// --- PROBE MODELS ---

/// Result of the SSH reachability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshProbe {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
}

/// Result of the local source-control identity probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub success: bool,
    pub email: String,
    pub error: Option<String>,
}
