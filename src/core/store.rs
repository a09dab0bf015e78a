// src/core/store.rs

//! # Configuration Store
//!
//! Owns the in-memory authoritative copy of the persisted document and its
//! durable backing file. The store is a service object with a
//! constructor-injected path: the composition root creates one and passes it
//! by reference, there is no ambient global.
//!
//! Every public operation takes the internal lock for its whole
//! read-modify-write cycle, so racing update intents serialize instead of
//! clobbering each other. No cross-process locking is provided; two processes
//! on one backing file are unsupported (last writer wins, whole-file
//! overwrite).

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;

use crate::constants::{HISTORY_PERSIST_CAP, RECENT_PROJECTS_CAP};
use crate::core::{migrator, paths, schema};
use crate::models::{ConfigDocument, CustomCommand, HistoryEntry, ScopeConfig, ScopePatch};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Path error: {0}")]
    Path(#[from] paths::PathError),
    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to replace configuration file: {0}")]
    Replace(#[from] tempfile::PersistError),
    #[error("'{0}' is not a known configuration variable.")]
    UnknownVariable(String),
}

/// The process-wide configuration store. Construct exactly one per process.
#[derive(Debug)]
pub struct ConfigStore {
    file_path: PathBuf,
    cache: Mutex<Option<ConfigDocument>>,
}

impl ConfigStore {
    /// Creates a store backed by an explicit file path. Nothing is read until
    /// the first access.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            cache: Mutex::new(None),
        }
    }

    /// Creates the store at the standard per-user location
    /// (`~/.commanddock/config.json`), creating the directory if needed.
    pub fn open_default() -> Result<Self, paths::PathError> {
        Ok(Self::new(paths::get_config_file_path()?))
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    // --- Read path ---

    /// Returns the current document, loading (and if necessary migrating) it
    /// from disk on first access.
    pub fn read(&self) -> ConfigDocument {
        let mut guard = self.cache.lock().unwrap();
        guard.get_or_insert_with(|| self.load_from_disk()).clone()
    }

    /// Drops the cache so the next `read` goes back to disk. Use when an
    /// external writer may have changed the backing file.
    pub fn invalidate(&self) {
        let mut guard = self.cache.lock().unwrap();
        *guard = None;
    }

    fn load_from_disk(&self) -> ConfigDocument {
        match fs::read_to_string(&self.file_path) {
            Ok(content) => {
                // Windows editors and PowerShell redirects can prepend a BOM.
                let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
                match serde_json::from_str::<Value>(content) {
                    Ok(raw) => {
                        let doc = migrator::normalize(&raw);
                        if migrator::needs_migration(&raw) {
                            log::info!(
                                "Configuration at '{}' was migrated; persisting the new format.",
                                self.file_path.display()
                            );
                            self.persist(&doc);
                        }
                        doc
                    }
                    Err(e) => {
                        // Deliberately do NOT overwrite the file here: a
                        // corrupt document stays on disk for manual recovery.
                        log::error!(
                            "Failed to parse configuration at '{}': {e}. Using in-memory defaults.",
                            self.file_path.display()
                        );
                        ConfigDocument::default_document()
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!(
                    "No configuration at '{}'; creating a fresh default document.",
                    self.file_path.display()
                );
                let doc = ConfigDocument::default_document();
                self.persist(&doc);
                doc
            }
            Err(e) => {
                log::error!(
                    "Failed to read configuration at '{}': {e}. Using in-memory defaults.",
                    self.file_path.display()
                );
                ConfigDocument::default_document()
            }
        }
    }

    // --- Write path ---

    /// Validates `doc` (defense against programmatic writes of an invalid
    /// shape), updates the cache, and overwrites the backing file. A storage
    /// failure is logged; the cache optimistically keeps the new state until
    /// a later write succeeds.
    pub fn write(&self, doc: &ConfigDocument) -> ConfigDocument {
        let mut guard = self.cache.lock().unwrap();
        let validated = revalidate(doc);
        *guard = Some(validated.clone());
        self.persist(&validated);
        validated
    }

    /// The single read-modify-write primitive every mutating accessor goes
    /// through. Runs entirely under the store lock.
    fn update<F: FnOnce(&mut ConfigDocument)>(&self, mutate: F) -> ConfigDocument {
        let mut guard = self.cache.lock().unwrap();
        let mut doc = guard.get_or_insert_with(|| self.load_from_disk()).clone();
        mutate(&mut doc);
        let validated = revalidate(&doc);
        *guard = Some(validated.clone());
        self.persist(&validated);
        validated
    }

    fn persist(&self, doc: &ConfigDocument) {
        if let Err(e) = self.try_persist(doc) {
            log::error!(
                "Failed to write configuration to '{}': {e}",
                self.file_path.display()
            );
        }
    }

    fn try_persist(&self, doc: &ConfigDocument) -> Result<(), StoreError> {
        let dir = self.file_path.parent().unwrap_or_else(|| Path::new("."));
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(doc)?;
        // Write to a sibling temp file, then rename over the target, so a
        // crash mid-write never leaves a torn document behind.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.file_path)?;
        Ok(())
    }

    /// Discards the cache and replaces the document with a fresh default.
    pub fn reset(&self) -> ConfigDocument {
        let mut guard = self.cache.lock().unwrap();
        let doc = ConfigDocument::default_document();
        *guard = Some(doc.clone());
        self.persist(&doc);
        doc
    }

    // --- Typed field accessors ---
    // The persisted document has a closed set of fields, so updates go
    // through explicit setters rather than stringly-typed path traversal.

    pub fn set_setup_done(&self, done: bool) -> ConfigDocument {
        self.update(|doc| doc.setup_done = done)
    }

    pub fn set_workspace_root(&self, root: &str) -> ConfigDocument {
        self.update(|doc| doc.workspace_root = root.to_string())
    }

    pub fn set_dry_run(&self, dry_run: bool) -> ConfigDocument {
        self.update(|doc| doc.ui.dry_run = dry_run)
    }

    pub fn set_collapsed(&self, group: &str, collapsed: bool) -> ConfigDocument {
        self.update(|doc| {
            doc.ui.collapsed.insert(group.to_string(), collapsed);
        })
    }

    /// Sets a global variable. Unknown names are rejected instead of being
    /// silently dropped by validation.
    pub fn set_global_var(&self, name: &str, value: &str) -> Result<ConfigDocument, StoreError> {
        if !schema::is_known(name) {
            return Err(StoreError::UnknownVariable(name.to_string()));
        }
        Ok(self.update(|doc| {
            doc.global.vars.insert(name.to_string(), value.to_string());
        }))
    }

    /// Sets a per-project override. The project entry is created on demand.
    pub fn set_project_var(
        &self,
        project: &str,
        name: &str,
        value: &str,
    ) -> Result<ConfigDocument, StoreError> {
        if !schema::is_known(name) {
            return Err(StoreError::UnknownVariable(name.to_string()));
        }
        Ok(self.update(|doc| {
            doc.projects
                .entry(project.to_string())
                .or_default()
                .vars
                .insert(name.to_string(), value.to_string());
        }))
    }

    /// Removes a per-project override so the project inherits the global
    /// value again.
    pub fn remove_project_var(&self, project: &str, name: &str) -> ConfigDocument {
        self.update(|doc| {
            if let Some(scope) = doc.projects.get_mut(project) {
                scope.vars.remove(name);
            }
        })
    }

    // --- Scoped reads ---

    /// The effective variable mapping for a project: global vars with the
    /// project's overrides applied on top, key by key.
    ///
    /// Override policy: a project key whose value is the empty string
    /// inherits the global value; absent-or-empty both inherit. An empty
    /// field in the project scope means "use the default", it is not a way
    /// to blank a variable.
    pub fn resolved_vars(&self, project: Option<&str>) -> BTreeMap<String, String> {
        let doc = self.read();
        let mut vars = doc.global.vars;
        if let Some(path) = project
            && let Some(scope) = doc.projects.get(path)
        {
            for (name, value) in &scope.vars {
                if !value.is_empty() {
                    vars.insert(name.clone(), value.clone());
                }
            }
        }
        vars
    }

    /// The per-project scope, or an empty default shape when the project has
    /// no overrides.
    pub fn project_config(&self, project: &str) -> ScopeConfig {
        self.read().projects.get(project).cloned().unwrap_or_default()
    }

    /// Shallow-merges `patch` onto the existing (or default-shaped)
    /// per-project entry, then writes the whole document.
    pub fn set_project_config(&self, project: &str, patch: ScopePatch) -> ConfigDocument {
        self.update(|doc| {
            let scope = doc.projects.entry(project.to_string()).or_default();
            if let Some(vars) = patch.vars {
                scope.vars = vars;
            }
            if let Some(custom_commands) = patch.custom_commands {
                scope.custom_commands = custom_commands;
            }
            if let Some(favorites) = patch.favorites {
                scope.favorites = favorites;
            }
        })
    }

    // --- Recent projects ---

    /// Moves (or inserts) `project` to the front of the recent list,
    /// deduplicated and capped.
    pub fn add_recent_project(&self, project: &str) -> ConfigDocument {
        self.update(|doc| {
            doc.recent_projects.retain(|p| p != project);
            doc.recent_projects.insert(0, project.to_string());
            doc.recent_projects.truncate(RECENT_PROJECTS_CAP);
        })
    }

    // --- History ---

    /// Appends one executed command, most-recent first, capped at rest.
    pub fn push_history(&self, entry: HistoryEntry) -> ConfigDocument {
        self.update(|doc| {
            doc.history.insert(0, entry);
            doc.history.truncate(HISTORY_PERSIST_CAP);
        })
    }

    pub fn clear_history(&self) -> ConfigDocument {
        self.update(|doc| doc.history.clear())
    }

    // --- Favorites & custom commands ---

    /// Toggles a command template in the favorites of the given scope.
    /// Returns true when the template ended up favorited.
    pub fn toggle_favorite(&self, project: Option<&str>, template: &str) -> bool {
        let mut now_favorite = false;
        self.update(|doc| {
            let favorites = match project {
                Some(path) => &mut doc.projects.entry(path.to_string()).or_default().favorites,
                None => &mut doc.global.favorites,
            };
            if favorites.iter().any(|f| f == template) {
                favorites.retain(|f| f != template);
            } else {
                favorites.push(template.to_string());
                now_favorite = true;
            }
        });
        now_favorite
    }

    /// Adds a custom command to the given scope. Entries whose label or
    /// template is empty are rejected by validation, so this silently drops
    /// them the same way a load would.
    pub fn add_custom_command(&self, project: Option<&str>, command: CustomCommand) -> ConfigDocument {
        self.update(|doc| {
            let commands = match project {
                Some(path) => {
                    &mut doc
                        .projects
                        .entry(path.to_string())
                        .or_default()
                        .custom_commands
                }
                None => &mut doc.global.custom_commands,
            };
            commands.retain(|c| c.label != command.label);
            commands.push(command);
        })
    }

    /// Removes a custom command by label. Returns true when something was
    /// removed.
    pub fn remove_custom_command(&self, project: Option<&str>, label: &str) -> bool {
        let mut removed = false;
        self.update(|doc| {
            let commands = match project {
                Some(path) => match doc.projects.get_mut(path) {
                    Some(scope) => &mut scope.custom_commands,
                    None => return,
                },
                None => &mut doc.global.custom_commands,
            };
            let before = commands.len();
            commands.retain(|c| c.label != label);
            removed = commands.len() != before;
        });
        removed
    }
}

/// Round-trips a typed document through the migrator so even programmatic
/// writes end up structurally valid.
fn revalidate(doc: &ConfigDocument) -> ConfigDocument {
    let value = serde_json::to_value(doc).unwrap_or(Value::Null);
    migrator::normalize(&value)
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HostOs;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> ConfigStore {
        ConfigStore::new(dir.join("config.json"))
    }

    #[test]
    fn first_read_creates_and_persists_defaults() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());

        let doc = store.read();
        assert_eq!(doc, ConfigDocument::default_document());
        assert!(store.file_path().exists(), "default document was persisted");

        let on_disk = fs::read_to_string(store.file_path()).expect("readable");
        assert!(on_disk.contains("\"version\": 2"));
    }

    #[test]
    fn corrupt_file_falls_back_without_overwriting() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        fs::write(store.file_path(), "{ not json at all").expect("write");

        let doc = store.read();
        assert_eq!(doc, ConfigDocument::default_document());

        // The broken file must survive for manual recovery.
        let on_disk = fs::read_to_string(store.file_path()).expect("readable");
        assert_eq!(on_disk, "{ not json at all");
    }

    #[test]
    fn byte_order_mark_is_stripped_before_parsing() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        fs::write(
            store.file_path(),
            "\u{feff}{\"version\":2,\"setupDone\":true}",
        )
        .expect("write");

        assert!(store.read().setup_done);
    }

    #[test]
    fn legacy_file_is_migrated_and_immediately_persisted() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        fs::write(
            store.file_path(),
            r#"{"vars":{"git_user":"Dana"},"ui":{"lastPath":"/home/dana/proj"}}"#,
        )
        .expect("write");

        let doc = store.read();
        assert!(doc.setup_done);
        assert_eq!(doc.workspace_root, "/home/dana");

        let on_disk = fs::read_to_string(store.file_path()).expect("readable");
        assert!(on_disk.contains("\"version\": 2"), "new format written back");
        assert!(on_disk.contains("\"Dana\""));
    }

    #[test]
    fn write_revalidates_programmatic_shapes() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());

        let mut doc = ConfigDocument::default_document();
        doc.global.vars.insert("not_a_real_var".into(), "x".into());
        doc.version = 0;

        let saved = store.write(&doc);
        assert_eq!(saved.version, 2);
        assert!(!saved.global.vars.contains_key("not_a_real_var"));
    }

    #[test]
    fn recent_projects_dedup_and_cap() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());

        for i in 0..25 {
            store.add_recent_project(&format!("/p/{i}"));
        }
        let doc = store.add_recent_project("/p/3");

        assert_eq!(doc.recent_projects.len(), RECENT_PROJECTS_CAP);
        assert_eq!(doc.recent_projects.first().map(String::as_str), Some("/p/3"));
        assert_eq!(
            doc.recent_projects.iter().filter(|p| p.as_str() == "/p/3").count(),
            1
        );
    }

    #[test]
    fn history_is_prepended_and_capped() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());

        for i in 0..(HISTORY_PERSIST_CAP + 10) {
            store.push_history(HistoryEntry {
                cmd: format!("cmd-{i}"),
                timestamp: String::new(),
                os: HostOs::Mac,
            });
        }

        let doc = store.read();
        assert_eq!(doc.history.len(), HISTORY_PERSIST_CAP);
        assert_eq!(
            doc.history.first().map(|h| h.cmd.as_str()),
            Some(format!("cmd-{}", HISTORY_PERSIST_CAP + 9).as_str())
        );
    }

    #[test]
    fn resolved_vars_overlay_project_on_global() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());

        store.set_global_var("git_branch", "main").expect("known var");
        store.set_project_var("/srv/app", "git_branch", "dev").expect("known var");

        let effective = store.resolved_vars(Some("/srv/app"));
        assert_eq!(effective.get("git_branch").map(String::as_str), Some("dev"));
        // No global key disappears just because the project has overrides.
        assert_eq!(effective.len(), schema::default_vars().len());

        let global_only = store.resolved_vars(None);
        assert_eq!(global_only.get("git_branch").map(String::as_str), Some("main"));
    }

    #[test]
    fn empty_project_override_inherits_global_value() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());

        store.set_global_var("git_remote", "origin").expect("known var");
        store.set_project_var("/srv/app", "git_remote", "").expect("known var");

        let effective = store.resolved_vars(Some("/srv/app"));
        assert_eq!(effective.get("git_remote").map(String::as_str), Some("origin"));
    }

    #[test]
    fn unknown_variable_names_are_rejected() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());

        let err = store.set_global_var("git_branhc", "dev").unwrap_err();
        assert!(matches!(err, StoreError::UnknownVariable(_)));
    }

    #[test]
    fn project_patch_is_a_shallow_merge() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());

        store.set_project_var("/srv/app", "git_branch", "dev").expect("known var");
        store.set_project_config(
            "/srv/app",
            ScopePatch {
                favorites: Some(vec!["git status".into()]),
                ..ScopePatch::default()
            },
        );

        let scope = store.project_config("/srv/app");
        assert_eq!(scope.vars.get("git_branch").map(String::as_str), Some("dev"));
        assert_eq!(scope.favorites, vec!["git status".to_string()]);
    }

    #[test]
    fn favorites_toggle_on_and_off() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());

        assert!(store.toggle_favorite(None, "git status"));
        assert!(!store.toggle_favorite(None, "git status"));
        assert!(store.read().global.favorites.is_empty());
    }

    #[test]
    fn custom_commands_replace_by_label_and_remove() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());

        let first = CustomCommand {
            label: "Deploy".into(),
            cmd: "make deploy".into(),
            desc: String::new(),
            vars: Vec::new(),
        };
        let second = CustomCommand {
            cmd: "make deploy-prod".into(),
            ..first.clone()
        };
        store.add_custom_command(None, first);
        store.add_custom_command(None, second);

        let doc = store.read();
        assert_eq!(doc.global.custom_commands.len(), 1);
        assert_eq!(
            doc.global.custom_commands.first().map(|c| c.cmd.as_str()),
            Some("make deploy-prod")
        );

        assert!(store.remove_custom_command(None, "Deploy"));
        assert!(!store.remove_custom_command(None, "Deploy"));
    }

    #[test]
    fn reset_restores_defaults() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());

        store.set_setup_done(true);
        store.set_workspace_root("/srv");
        let doc = store.reset();

        assert_eq!(doc, ConfigDocument::default_document());
        assert_eq!(store.read(), ConfigDocument::default_document());
    }

    #[test]
    fn invalidate_picks_up_external_writes() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(dir.path());
        store.read();

        fs::write(
            store.file_path(),
            r#"{"version":2,"workspaceRoot":"/external"}"#,
        )
        .expect("write");

        // Cached copy is still authoritative until invalidated.
        assert_eq!(store.read().workspace_root, "");
        store.invalidate();
        assert_eq!(store.read().workspace_root, "/external");
    }

    #[test]
    fn failed_persist_keeps_optimistic_cache() {
        let dir = tempdir().expect("tempdir");
        // Parent of the backing file is a regular file, so every persist fails.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").expect("write");
        let store = ConfigStore::new(blocker.join("config.json"));

        let doc = store.set_workspace_root("/srv");
        assert_eq!(doc.workspace_root, "/srv");
        // The in-memory state reflects the attempted write.
        assert_eq!(store.read().workspace_root, "/srv");
    }
}
