// src/core/scanner.rs

//! # Workspace Scanner
//!
//! The directory-scan collaborator: immediate entry names only, never
//! recursive, never reading file contents. On top of the raw listing sits
//! stack detection, a static marker-filename to technology-label table.

use rayon::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::constants::{PROJECT_FILE_CAP, SCAN_ENTRY_CAP};
use crate::models::ProjectEntry;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: '{0}'")]
    NotFound(String),
    #[error("Not a directory: '{0}'")]
    NotADirectory(String),
    #[error("Filesystem error while scanning '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Marker filename → stack label.
static FILE_TO_STACK: &[(&str, &str)] = &[
    ("package.json", "Node.js"),
    ("tsconfig.json", "TypeScript"),
    ("Dockerfile", "Docker"),
    ("docker-compose.yml", "Docker"),
    ("docker-compose.yaml", "Docker"),
    ("requirements.txt", "Python"),
    ("Pipfile", "Python"),
    ("pyproject.toml", "Python"),
    ("Cargo.toml", "Rust"),
    ("go.mod", "Go"),
    ("pom.xml", "Java"),
    ("build.gradle", "Java"),
    (".git", "Git"),
    ("vite.config.js", "Vite"),
    ("vite.config.ts", "Vite"),
    ("next.config.js", "Next.js"),
    ("next.config.mjs", "Next.js"),
    ("next.config.ts", "Next.js"),
    ("nuxt.config.js", "Nuxt"),
    ("nuxt.config.ts", "Nuxt"),
    ("angular.json", "Angular"),
    ("pubspec.yaml", "Flutter"),
    ("Gemfile", "Ruby"),
    ("composer.json", "PHP"),
    ("tailwind.config.js", "TailwindCSS"),
    ("tailwind.config.ts", "TailwindCSS"),
    ("firebase.json", "Firebase"),
    (".firebaserc", "Firebase"),
    ("serverless.yml", "Serverless"),
    ("turbo.json", "Turborepo"),
    ("vue.config.js", "Vue.js"),
    ("expo.json", "Expo / RN"),
    ("app.json", "React Native"),
    (".env", "Env Vars"),
];

/// Detects stack labels from a list of entry names, first hit per label wins.
pub fn detect_stacks(files: &[String]) -> Vec<&'static str> {
    let mut stacks: Vec<&'static str> = Vec::new();
    for file in files {
        if let Some(&(_, stack)) = FILE_TO_STACK.iter().find(|(marker, _)| *marker == file.as_str())
            && !stacks.contains(&stack)
        {
            stacks.push(stack);
        }
    }
    stacks
}

/// Lists the immediate entry names of `path`, sorted for stable output.
/// Unreadable entries are skipped rather than failing the whole listing.
pub fn scan_dir(path: &Path) -> Result<Vec<String>, ScanError> {
    if !path.exists() {
        return Err(ScanError::NotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(ScanError::NotADirectory(path.display().to_string()));
    }
    let entries = fs::read_dir(path).map_err(|e| ScanError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

/// Scans a workspace root for projects: every immediate subdirectory (except
/// dotted entries and `node_modules`) becomes a candidate, with its stacks
/// detected from its own immediate entries. Per-entry failures are skipped.
pub fn scan_workspace(root: &Path) -> Result<Vec<ProjectEntry>, ScanError> {
    let names = scan_dir(root)?;
    log::debug!("Scanning workspace '{}': {} entries", root.display(), names.len());

    let mut projects: Vec<ProjectEntry> = names
        .par_iter()
        .filter(|name| !name.starts_with('.') && name.as_str() != "node_modules")
        .filter_map(|name| {
            let dir_path = root.join(name);
            let metadata = fs::metadata(&dir_path).ok()?;
            if !metadata.is_dir() {
                return None;
            }
            let mut files = scan_dir(&dir_path).ok()?;
            files.truncate(SCAN_ENTRY_CAP);
            let stacks = detect_stacks(&files);
            files.truncate(PROJECT_FILE_CAP);
            Some(ProjectEntry {
                name: name.clone(),
                path: dir_path,
                stacks,
                files,
            })
        })
        .collect();

    projects.sort_by(|a, b| a.name.cmp(&b.name));
    log::debug!("Detected {} projects under '{}'", projects.len(), root.display());
    Ok(projects)
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, "").expect("create file");
    }

    #[test]
    fn detect_stacks_maps_markers_without_duplicates() {
        let files = vec![
            "Dockerfile".to_string(),
            "docker-compose.yml".to_string(),
            "package.json".to_string(),
            "notes.txt".to_string(),
        ];
        assert_eq!(detect_stacks(&files), vec!["Docker", "Node.js"]);
    }

    #[test]
    fn scan_dir_reports_missing_and_non_directories() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        assert!(matches!(scan_dir(&missing), Err(ScanError::NotFound(_))));

        let file = dir.path().join("plain.txt");
        touch(&file);
        assert!(matches!(scan_dir(&file), Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn scan_workspace_finds_projects_and_skips_noise() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();

        let api = root.join("api");
        fs::create_dir(&api).expect("mkdir");
        touch(&api.join("package.json"));
        touch(&api.join("Dockerfile"));

        let tool = root.join("tool");
        fs::create_dir_all(tool.join(".git")).expect("mkdir");
        touch(&tool.join("Cargo.toml"));

        fs::create_dir(root.join("node_modules")).expect("mkdir");
        fs::create_dir(root.join(".cache")).expect("mkdir");
        touch(&root.join("loose-file.txt"));

        let projects = scan_workspace(root).expect("scan");
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["api", "tool"]);

        // Entry names are sorted, so Dockerfile is seen before package.json.
        let api_entry = projects.iter().find(|p| p.name == "api").expect("api entry");
        assert_eq!(api_entry.stacks, vec!["Docker", "Node.js"]);

        let tool_entry = projects.iter().find(|p| p.name == "tool").expect("tool entry");
        assert_eq!(tool_entry.stacks, vec!["Git", "Rust"]);
    }
}
