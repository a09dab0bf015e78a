// src/constants.rs

/// The name of the per-user directory holding CommandDock state (in the home dir).
pub const CONFIG_DIR_NAME: &str = ".commanddock";

/// The name of the persisted configuration document (inside ~/.commanddock/).
pub const CONFIG_FILENAME: &str = "config.json";

/// The current schema version of the persisted document.
pub const SCHEMA_VERSION: u32 = 2;

/// Maximum number of entries kept in `recentProjects`.
pub const RECENT_PROJECTS_CAP: usize = 20;

/// Maximum number of history entries persisted in the document.
pub const HISTORY_PERSIST_CAP: usize = 100;

/// Maximum number of history entries exposed to the in-memory/UI view.
pub const HISTORY_VIEW_CAP: usize = 50;

/// Maximum number of directory entries inspected per project during a scan.
pub const SCAN_ENTRY_CAP: usize = 50;

/// Maximum number of marker filenames remembered per scanned project.
pub const PROJECT_FILE_CAP: usize = 20;

/// Default wall-clock budget for a general command invocation, in seconds.
pub const COMMAND_TIMEOUT_SECS: u64 = 30;

/// Overall budget for the SSH reachability probe, in seconds.
pub const SSH_PROBE_TIMEOUT_SECS: u64 = 10;

/// TCP connect budget passed to the ssh client itself, in seconds.
pub const SSH_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Budget for the local git identity probe, in seconds.
pub const GIT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Commands slower than this many milliseconds trigger a completion notification.
pub const NOTIFY_THRESHOLD_MS: u128 = 3_000;
