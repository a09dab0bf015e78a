// src/core/catalog.rs

//! # Command Catalog
//!
//! The static mapping from detected marker filenames to named, colored
//! command groups, plus the always-available remote and per-OS system
//! groups. Command templates use `{{var}}` for persisted variables and
//! `{name}` for per-invocation inline inputs.

use colored::Color;

use crate::models::{CommandGroup, CommandSpec, HostOs};

fn cmd(label: &str, template: &str, desc: &str) -> CommandSpec {
    CommandSpec {
        label: label.to_string(),
        cmd: template.to_string(),
        desc: desc.to_string(),
        vars: Vec::new(),
        danger: false,
        input: None,
    }
}

fn svec(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn docker_compose_group() -> CommandGroup {
    CommandGroup {
        category: "Docker".to_string(),
        icon: "🐳",
        color: Color::TrueColor { r: 0x0d, g: 0xb7, b: 0xed },
        commands: vec![
            cmd("Build & Up", "docker compose up -d --build", "Rebuild and start"),
            CommandSpec {
                danger: true,
                ..cmd("Stop All", "docker compose down", "Stop containers")
            },
            cmd("Logs", "docker compose logs -f --tail=100", "Tail logs"),
            cmd("Restart", "docker compose restart", "Restart services"),
            cmd("PS", "docker compose ps", "Container status"),
            cmd("Pull", "docker compose pull", "Pull images"),
        ],
    }
}

fn git_group() -> CommandGroup {
    CommandGroup {
        category: "Git".to_string(),
        icon: "📦",
        color: Color::TrueColor { r: 0xf0, g: 0x50, b: 0x32 },
        commands: vec![
            cmd("Status", "git status", "Show changes"),
            CommandSpec {
                vars: svec(&["git_remote", "git_branch"]),
                ..cmd("Pull", "git pull {{git_remote}} {{git_branch}}", "Fetch changes")
            },
            cmd("Add All", "git add .", "Stage everything"),
            CommandSpec {
                input: Some("message".to_string()),
                ..cmd("Commit", "git commit -m \"{message}\"", "Create a commit")
            },
            CommandSpec {
                vars: svec(&["git_remote", "git_branch"]),
                ..cmd("Push", "git push {{git_remote}} {{git_branch}}", "Push changes")
            },
            cmd("Log", "git log --oneline --graph -20", "Visual history"),
            cmd("Stash", "git stash", "Stash work in progress"),
            CommandSpec {
                danger: true,
                ..cmd("Reset Hard", "git reset --hard HEAD", "Discard all local changes")
            },
        ],
    }
}

fn node_group() -> CommandGroup {
    CommandGroup {
        category: "Node.js".to_string(),
        icon: "📗",
        color: Color::TrueColor { r: 0x68, g: 0xa0, b: 0x63 },
        commands: vec![
            CommandSpec {
                vars: svec(&["pkg_manager"]),
                ..cmd("Install", "{{pkg_manager}} install", "Install dependencies")
            },
            CommandSpec {
                vars: svec(&["pkg_manager"]),
                ..cmd("Dev", "{{pkg_manager}} run dev", "Dev server")
            },
            CommandSpec {
                vars: svec(&["pkg_manager"]),
                ..cmd("Build", "{{pkg_manager}} run build", "Production build")
            },
            CommandSpec {
                vars: svec(&["pkg_manager"]),
                ..cmd("Lint", "{{pkg_manager}} run lint", "Check style")
            },
            CommandSpec {
                vars: svec(&["pkg_manager"]),
                ..cmd("Audit", "{{pkg_manager}} audit fix", "Fix vulnerabilities")
            },
        ],
    }
}

fn dockerfile_group() -> CommandGroup {
    CommandGroup {
        category: "Docker Build".to_string(),
        icon: "🏗️",
        color: Color::TrueColor { r: 0x38, g: 0x4d, b: 0x54 },
        commands: vec![
            CommandSpec {
                vars: svec(&["docker_prefix"]),
                input: Some("name".to_string()),
                ..cmd("Build", "docker build -t {{docker_prefix}}/{name} .", "Build image")
            },
            CommandSpec {
                vars: svec(&["docker_prefix"]),
                input: Some("name".to_string()),
                ..cmd("Run", "docker run -d {{docker_prefix}}/{name}", "Run image")
            },
            CommandSpec {
                vars: svec(&["docker_registry"]),
                input: Some("name".to_string()),
                ..cmd("Push Image", "docker push {{docker_registry}}/{name}", "Push to the registry")
            },
        ],
    }
}

fn vue_group() -> CommandGroup {
    CommandGroup {
        category: "Vue.js".to_string(),
        icon: "💚",
        color: Color::TrueColor { r: 0x42, g: 0xb8, b: 0x83 },
        commands: vec![
            CommandSpec {
                vars: svec(&["pkg_manager"]),
                ..cmd("Serve", "{{pkg_manager}} run serve", "Vue dev server")
            },
            CommandSpec {
                vars: svec(&["pkg_manager"]),
                ..cmd("Build", "{{pkg_manager}} run build", "Build")
            },
        ],
    }
}

fn expo_group() -> CommandGroup {
    CommandGroup {
        category: "Expo / RN".to_string(),
        icon: "📱",
        color: Color::TrueColor { r: 0x46, g: 0x30, b: 0xeb },
        commands: vec![
            cmd("Start", "npx expo start", "Expo dev server"),
            cmd("Android", "npx expo run:android", "Run on Android"),
            cmd("iOS", "npx expo run:ios", "Run on iOS"),
            cmd("Build APK", "eas build --platform android", "Android build"),
        ],
    }
}

/// Marker filenames and their group builders, in display order.
static MARKERS: &[(&str, fn() -> CommandGroup)] = &[
    ("docker-compose.yml", docker_compose_group),
    (".git", git_group),
    ("package.json", node_group),
    ("Dockerfile", dockerfile_group),
    ("vue.config.js", vue_group),
    ("expo.json", expo_group),
];

/// The groups whose marker file appears in `files`.
pub fn groups_for_files(files: &[String]) -> Vec<CommandGroup> {
    MARKERS
        .iter()
        .filter(|(marker, _)| files.iter().any(|f| f == marker))
        .map(|(_, build)| build())
        .collect()
}

/// The always-available remote access group.
pub fn remote_group() -> CommandGroup {
    CommandGroup {
        category: "Tailscale Remote".to_string(),
        icon: "🌐",
        color: Color::TrueColor { r: 0x4c, g: 0x8b, b: 0xf5 },
        commands: vec![
            CommandSpec {
                vars: svec(&["ssh_user", "ssh_host"]),
                ..cmd("SSH Connect", "ssh {{ssh_user}}@{{ssh_host}}", "Connect over Tailscale")
            },
            CommandSpec {
                vars: svec(&["ssh_user", "ssh_host"]),
                ..cmd("Remote PS", "ssh {{ssh_user}}@{{ssh_host}} 'docker ps'", "Remote containers")
            },
            CommandSpec {
                vars: svec(&["ssh_user", "ssh_host", "remote_project_path"]),
                ..cmd(
                    "Remote Logs",
                    "ssh {{ssh_user}}@{{ssh_host}} 'docker compose -f {{remote_project_path}}/docker-compose.yml logs --tail=50'",
                    "Remote logs",
                )
            },
            CommandSpec {
                vars: svec(&["ssh_user", "ssh_host", "remote_project_path"]),
                danger: true,
                ..cmd(
                    "Restart Remote",
                    "ssh {{ssh_user}}@{{ssh_host}} 'docker compose -f {{remote_project_path}}/docker-compose.yml restart'",
                    "Restart remote services",
                )
            },
            cmd("TS Status", "tailscale status", "Connected devices"),
            CommandSpec {
                vars: svec(&["ssh_user", "ssh_host"]),
                ..cmd("File Sync", "tailscale file cp ./build {{ssh_user}}@{{ssh_host}}:", "Send files")
            },
        ],
    }
}

/// The per-OS system utilities group.
pub fn system_group(os: HostOs) -> CommandGroup {
    match os {
        HostOs::Windows => CommandGroup {
            category: "Windows System".to_string(),
            icon: "🖥️",
            color: Color::TrueColor { r: 0x00, g: 0xa4, b: 0xef },
            commands: vec![
                cmd("Disk", "wmic logicaldisk get size,freespace,caption", "Disk space"),
                cmd("Ports", "netstat -ano | findstr LISTENING", "Listening ports"),
                cmd("Tasks", "tasklist /FI \"MEMUSAGE gt 100000\"", "Heavy processes"),
            ],
        },
        HostOs::Mac => CommandGroup {
            category: "macOS System".to_string(),
            icon: "🍎",
            color: Color::TrueColor { r: 0xa2, g: 0xaa, b: 0xad },
            commands: vec![
                cmd("Disk", "df -h", "Disk space"),
                cmd("Ports", "lsof -iTCP -sTCP:LISTEN", "Listening ports"),
                cmd("Top", "top -l 1 -n 10 -o mem", "Processes by memory"),
            ],
        },
    }
}

/// Every group applicable to a project: marker-driven groups first, then the
/// remote and system groups that are always offered.
pub fn all_groups(files: &[String], os: HostOs) -> Vec<CommandGroup> {
    let mut groups = groups_for_files(files);
    groups.push(remote_group());
    groups.push(system_group(os));
    groups
}

/// Finds a command by label across `groups`, first match wins.
pub fn find_command<'a>(
    groups: &'a [CommandGroup],
    label: &str,
) -> Option<(&'a CommandGroup, &'a CommandSpec)> {
    for group in groups {
        if let Some(spec) = group.commands.iter().find(|c| c.label == label) {
            return Some((group, spec));
        }
    }
    None
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_files_select_their_groups() {
        let files = vec!["package.json".to_string(), ".git".to_string(), "README.md".to_string()];
        let groups = groups_for_files(&files);
        let categories: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, vec!["Git", "Node.js"]);
    }

    #[test]
    fn all_groups_always_include_remote_and_system() {
        let groups = all_groups(&[], HostOs::Mac);
        let categories: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, vec!["Tailscale Remote", "macOS System"]);
    }

    #[test]
    fn destructive_commands_are_flagged() {
        let git = git_group();
        let reset = git
            .commands
            .iter()
            .find(|c| c.label == "Reset Hard")
            .expect("catalog entry");
        assert!(reset.danger);

        let compose = docker_compose_group();
        let down = compose
            .commands
            .iter()
            .find(|c| c.label == "Stop All")
            .expect("catalog entry");
        assert!(down.danger);
    }

    #[test]
    fn find_command_matches_by_label() {
        let groups = all_groups(&[".git".to_string()], HostOs::Mac);
        let (group, spec) = find_command(&groups, "Push").expect("present");
        assert_eq!(group.category, "Git");
        assert_eq!(spec.vars, vec!["git_remote".to_string(), "git_branch".to_string()]);
        assert!(find_command(&groups, "No Such Label").is_none());
    }

    #[test]
    fn inline_input_slots_are_declared() {
        let groups = [git_group()];
        let (_, commit) = find_command(&groups, "Commit").expect("present");
        assert_eq!(commit.input.as_deref(), Some("message"));
    }
}
