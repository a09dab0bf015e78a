// src/core/migrator.rs

//! # Document Schema & Migrator
//!
//! `normalize` turns arbitrary parsed JSON into a structurally valid
//! [`ConfigDocument`]: legacy (pre-v2) shapes are migrated, every collection
//! is type-checked and replaced with an empty container on mismatch, and
//! unknown variable keys are dropped. The output is always fully valid no
//! matter how malformed the input was, so the store never observes a torn
//! document.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::constants::{HISTORY_PERSIST_CAP, RECENT_PROJECTS_CAP, SCHEMA_VERSION};
use crate::core::schema;
use crate::models::{ConfigDocument, CustomCommand, HistoryEntry, HostOs, ScopeConfig, UiState};

/// Whether `raw` is a pre-v2 (or unversioned) document that `normalize` will
/// migrate. The store persists the migrated result immediately when this
/// returns true. Non-object input is not "migration": it yields a fresh
/// default without touching the on-disk file.
pub fn needs_migration(raw: &Value) -> bool {
    match raw.as_object() {
        Some(map) => map
            .get("version")
            .and_then(Value::as_u64)
            .is_none_or(|v| v < u64::from(SCHEMA_VERSION)),
        None => false,
    }
}

/// Normalizes arbitrary structured data into a valid v2 document.
pub fn normalize(raw: &Value) -> ConfigDocument {
    let Some(map) = raw.as_object() else {
        log::warn!("Configuration root is not an object; using defaults.");
        return ConfigDocument::default_document();
    };

    // An empty object carries no evidence of an existing installation, so it
    // gets the first-run defaults (setupDone=false) instead of the legacy
    // migration path.
    if map.is_empty() {
        return ConfigDocument::default_document();
    }

    let version = map.get("version").and_then(Value::as_u64).unwrap_or(0);
    if version < u64::from(SCHEMA_VERSION) {
        let migrated = migrate_v1(map);
        validate(&migrated)
    } else {
        validate(map)
    }
}

/// Lifts a flat legacy (v1) document into the v2 shape. An existing legacy
/// user skips onboarding; their last opened path seeds the workspace root and
/// the recent-projects list.
fn migrate_v1(raw: &Map<String, Value>) -> Map<String, Value> {
    log::info!("Migrating legacy configuration to schema v{SCHEMA_VERSION}");

    let ui = raw.get("ui").and_then(Value::as_object);
    let last_path = ui
        .and_then(|u| u.get("lastPath"))
        .and_then(Value::as_str)
        .unwrap_or("");

    let workspace_root = if last_path.is_empty() {
        String::new()
    } else {
        Path::new(last_path)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let recent_projects = if last_path.is_empty() {
        Value::Array(Vec::new())
    } else {
        Value::Array(vec![Value::String(last_path.to_string())])
    };

    let mut global = Map::new();
    global.insert("vars".into(), raw.get("vars").cloned().unwrap_or(Value::Null));
    global.insert(
        "customCommands".into(),
        raw.get("customCommands").cloned().unwrap_or(Value::Null),
    );
    global.insert(
        "favorites".into(),
        raw.get("favorites").cloned().unwrap_or(Value::Null),
    );

    let mut new_ui = Map::new();
    new_ui.insert(
        "collapsed".into(),
        ui.and_then(|u| u.get("collapsed")).cloned().unwrap_or(Value::Null),
    );
    new_ui.insert(
        "dryRun".into(),
        ui.and_then(|u| u.get("dryRun")).cloned().unwrap_or(Value::Null),
    );

    let mut out = Map::new();
    out.insert("version".into(), Value::from(SCHEMA_VERSION));
    out.insert("setupDone".into(), Value::Bool(true));
    out.insert("workspaceRoot".into(), Value::String(workspace_root));
    out.insert("recentProjects".into(), recent_projects);
    out.insert("global".into(), Value::Object(global));
    out.insert("projects".into(), Value::Object(Map::new()));
    out.insert("history".into(), raw.get("history").cloned().unwrap_or(Value::Null));
    out.insert("ui".into(), Value::Object(new_ui));
    out
}

/// Field-by-field validation of an (at least nominally) v2 document.
fn validate(raw: &Map<String, Value>) -> ConfigDocument {
    ConfigDocument {
        version: SCHEMA_VERSION,
        setup_done: raw.get("setupDone").and_then(Value::as_bool).unwrap_or(false),
        workspace_root: string_or_empty(raw.get("workspaceRoot")),
        recent_projects: validate_recent_projects(raw.get("recentProjects")),
        global: validate_scope(raw.get("global"), true),
        projects: validate_projects(raw.get("projects")),
        history: validate_history(raw.get("history")),
        ui: validate_ui(raw.get("ui")),
    }
}

fn string_or_empty(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or("").to_string()
}

fn validate_recent_projects(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if let Some(path) = item.as_str()
            && !out.iter().any(|p| p == path)
        {
            out.push(path.to_string());
        }
    }
    out.truncate(RECENT_PROJECTS_CAP);
    out
}

/// Validates one scope. The global scope is always fully populated with the
/// schema defaults; project scopes keep only the keys they override.
fn validate_scope(value: Option<&Value>, fill_defaults: bool) -> ScopeConfig {
    let scope = value.and_then(Value::as_object);
    ScopeConfig {
        vars: validate_vars(scope.and_then(|s| s.get("vars")), fill_defaults),
        custom_commands: validate_custom_commands(scope.and_then(|s| s.get("customCommands"))),
        favorites: validate_favorites(scope.and_then(|s| s.get("favorites"))),
    }
}

fn validate_vars(value: Option<&Value>, fill_defaults: bool) -> BTreeMap<String, String> {
    let mut vars = if fill_defaults {
        schema::default_vars()
    } else {
        BTreeMap::new()
    };
    if let Some(raw_vars) = value.and_then(Value::as_object) {
        for (key, raw_value) in raw_vars {
            if !schema::is_known(key) {
                log::debug!("Dropping unknown variable '{key}' during validation.");
                continue;
            }
            if let Some(text) = raw_value.as_str() {
                vars.insert(key.clone(), text.to_string());
            }
        }
    }
    vars
}

fn validate_custom_commands(value: Option<&Value>) -> Vec<CustomCommand> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let entry = item.as_object()?;
            let label = entry.get("label")?.as_str()?;
            let cmd = entry.get("cmd")?.as_str()?;
            if label.is_empty() || cmd.is_empty() {
                return None;
            }
            Some(CustomCommand {
                label: label.to_string(),
                cmd: cmd.to_string(),
                desc: string_or_empty(entry.get("desc")),
                vars: entry
                    .get("vars")
                    .and_then(Value::as_array)
                    .map(|vars| {
                        vars.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            })
        })
        .collect()
}

fn validate_favorites(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if let Some(fav) = item.as_str()
            && !out.iter().any(|f| f == fav)
        {
            out.push(fav.to_string());
        }
    }
    out
}

fn validate_projects(value: Option<&Value>) -> BTreeMap<String, ScopeConfig> {
    let Some(entries) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    let mut projects = BTreeMap::new();
    for (path, raw_scope) in entries {
        if !raw_scope.is_object() {
            log::debug!("Skipping non-object project entry '{path}'.");
            continue;
        }
        projects.insert(path.clone(), validate_scope(Some(raw_scope), false));
    }
    projects
}

fn validate_history(value: Option<&Value>) -> Vec<HistoryEntry> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut history: Vec<HistoryEntry> = items
        .iter()
        .filter_map(|item| {
            let entry = item.as_object()?;
            let cmd = entry.get("cmd")?.as_str()?;
            if cmd.is_empty() {
                return None;
            }
            Some(HistoryEntry {
                cmd: cmd.to_string(),
                timestamp: string_or_empty(entry.get("time")),
                os: match entry.get("os").and_then(Value::as_str) {
                    Some("mac") => HostOs::Mac,
                    Some("windows") => HostOs::Windows,
                    _ => HostOs::detect(),
                },
            })
        })
        .collect();
    history.truncate(HISTORY_PERSIST_CAP);
    history
}

fn validate_ui(value: Option<&Value>) -> UiState {
    let ui = value.and_then(Value::as_object);
    let mut collapsed = BTreeMap::new();
    if let Some(raw_collapsed) = ui.and_then(|u| u.get("collapsed")).and_then(Value::as_object) {
        for (key, raw_value) in raw_collapsed {
            if let Some(flag) = raw_value.as_bool() {
                collapsed.insert(key.clone(), flag);
            }
        }
    }
    UiState {
        collapsed,
        dry_run: ui
            .and_then(|u| u.get("dryRun"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_yields_first_run_defaults() {
        let doc = normalize(&json!({}));
        assert_eq!(doc.version, SCHEMA_VERSION);
        assert!(!doc.setup_done);
        assert_eq!(doc.global.vars, schema::default_vars());
        assert!(doc.projects.is_empty());
        assert!(doc.history.is_empty());
    }

    #[test]
    fn non_object_input_yields_defaults() {
        for raw in [json!(null), json!("text"), json!([1, 2, 3]), json!(42)] {
            let doc = normalize(&raw);
            assert_eq!(doc, ConfigDocument::default_document());
            assert!(!needs_migration(&raw));
        }
    }

    #[test]
    fn legacy_document_is_lifted_to_v2() {
        let raw = json!({
            "vars": { "git_user": "Dana" },
            "history": [ { "cmd": "ls" } ],
            "ui": { "lastPath": "/home/dana/proj" }
        });
        assert!(needs_migration(&raw));

        let doc = normalize(&raw);
        assert_eq!(doc.version, SCHEMA_VERSION);
        assert!(doc.setup_done, "legacy users skip onboarding");
        assert_eq!(doc.workspace_root, "/home/dana");
        assert_eq!(doc.recent_projects, vec!["/home/dana/proj".to_string()]);
        assert_eq!(doc.global.vars.get("git_user").map(String::as_str), Some("Dana"));
        // Untouched keys sit at their schema defaults.
        assert_eq!(doc.global.vars.get("git_branch").map(String::as_str), Some("main"));
        assert_eq!(doc.history.len(), 1);
        assert_eq!(doc.history.first().map(|h| h.cmd.as_str()), Some("ls"));
        assert!(doc.projects.is_empty());
    }

    #[test]
    fn migration_is_idempotent() {
        let raw = json!({
            "vars": { "git_user": "Dana", "pkg_manager": "pnpm" },
            "customCommands": [ { "label": "Deploy", "cmd": "make deploy" } ],
            "favorites": [ "git status" ],
            "history": [ { "cmd": "ls", "time": "2024-01-01T00:00:00Z", "os": "mac" } ],
            "ui": { "lastPath": "/srv/app", "dryRun": true }
        });
        let once = normalize(&raw);
        let round_tripped = serde_json::to_value(&once).expect("serializable");
        assert!(!needs_migration(&round_tripped));
        let twice = normalize(&round_tripped);
        assert_eq!(once, twice);
    }

    #[test]
    fn mismatched_container_shapes_are_replaced_with_empty_ones() {
        let raw = json!({
            "version": 2,
            "recentProjects": "not-a-list",
            "history": { "cmd": "ls" },
            "global": {
                "vars": { "git_branch": "dev", "bogus_key": "x", "editor": 7 },
                "customCommands": [
                    { "label": "ok", "cmd": "echo hi" },
                    { "label": "", "cmd": "dropped" },
                    { "label": "no-cmd" },
                    "junk"
                ],
                "favorites": [ "git status", 3, "git status" ]
            },
            "ui": { "collapsed": { "Git": true, "Docker": "yes" }, "dryRun": "nope" }
        });
        let doc = normalize(&raw);

        assert!(doc.recent_projects.is_empty());
        assert!(doc.history.is_empty());
        assert_eq!(doc.global.vars.get("git_branch").map(String::as_str), Some("dev"));
        assert!(!doc.global.vars.contains_key("bogus_key"));
        // Non-string value for a known key keeps the default instead.
        assert_eq!(doc.global.vars.get("editor").map(String::as_str), Some("code"));
        assert_eq!(doc.global.custom_commands.len(), 1);
        assert_eq!(doc.global.favorites, vec!["git status".to_string()]);
        assert_eq!(doc.ui.collapsed.get("Git"), Some(&true));
        assert!(!doc.ui.collapsed.contains_key("Docker"));
        assert!(!doc.ui.dry_run);
    }

    #[test]
    fn project_entries_are_validated_individually() {
        let raw = json!({
            "version": 2,
            "projects": {
                "/srv/app": { "vars": { "git_branch": "dev", "junk": "x" } },
                "/srv/broken": "not-an-object",
                "/srv/bare": {}
            }
        });
        let doc = normalize(&raw);

        assert_eq!(doc.projects.len(), 2);
        let app = doc.projects.get("/srv/app").expect("validated entry");
        assert_eq!(app.vars.get("git_branch").map(String::as_str), Some("dev"));
        assert!(!app.vars.contains_key("junk"));
        // Project scopes are not filled with defaults: empty means inherit.
        assert_eq!(app.vars.len(), 1);
        let bare = doc.projects.get("/srv/bare").expect("defaulted shape");
        assert!(bare.vars.is_empty());
        assert!(bare.custom_commands.is_empty());
        assert!(bare.favorites.is_empty());
    }

    #[test]
    fn history_is_capped_at_rest() {
        let entries: Vec<Value> = (0..150).map(|i| json!({ "cmd": format!("cmd-{i}") })).collect();
        let doc = normalize(&json!({ "version": 2, "history": entries }));
        assert_eq!(doc.history.len(), HISTORY_PERSIST_CAP);
        assert_eq!(doc.history.first().map(|h| h.cmd.as_str()), Some("cmd-0"));
    }

    #[test]
    fn recent_projects_are_deduplicated_and_capped() {
        let mut entries: Vec<Value> = (0..30).map(|i| json!(format!("/p/{i}"))).collect();
        entries.insert(0, json!("/p/5"));
        let doc = normalize(&json!({ "version": 2, "recentProjects": entries }));
        assert_eq!(doc.recent_projects.len(), RECENT_PROJECTS_CAP);
        assert_eq!(
            doc.recent_projects.iter().filter(|p| p.as_str() == "/p/5").count(),
            1
        );
    }
}
