// src/core/schema.rs

//! The fixed catalog of legal configuration variable names and their
//! metadata. This is configuration metadata, not user data: it defines which
//! keys may appear in a scope's `vars` map and what the global defaults are.

use std::collections::BTreeMap;

/// Metadata for one configuration variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub desc: &'static str,
    pub group: &'static str,
    /// Example value shown in prompts; not a default.
    pub placeholder: &'static str,
    /// The value the global scope starts with. Mostly empty: a variable with
    /// no sensible universal value must be configured before commands that
    /// declare it can run.
    pub default: &'static str,
    /// Enumerated choice set, empty when the value is free-form.
    pub choices: &'static [&'static str],
}

/// The single source of truth for legal variable names, in display order.
pub static VAR_SCHEMA: &[VarSpec] = &[
    VarSpec {
        name: "ssh_user",
        label: "SSH user",
        desc: "User name for remote SSH connections.",
        group: "Tailscale / SSH",
        placeholder: "daniel",
        default: "",
        choices: &[],
    },
    VarSpec {
        name: "ssh_host",
        label: "SSH hostname",
        desc: "Hostname of the server on the Tailscale network.",
        group: "Tailscale / SSH",
        placeholder: "minisforum-n5",
        default: "",
        choices: &[],
    },
    VarSpec {
        name: "ssh_ip",
        label: "Tailscale IP",
        desc: "IP of the server on the Tailscale network.",
        group: "Tailscale / SSH",
        placeholder: "100.64.0.1",
        default: "",
        choices: &[],
    },
    VarSpec {
        name: "remote_project_path",
        label: "Remote project path",
        desc: "Base directory for projects on the server.",
        group: "Tailscale / SSH",
        placeholder: "/home/daniel/projects",
        default: "",
        choices: &[],
    },
    VarSpec {
        name: "git_user",
        label: "Git name",
        desc: "Name used for Git commits.",
        group: "Git",
        placeholder: "Daniel Galindo",
        default: "",
        choices: &[],
    },
    VarSpec {
        name: "git_email",
        label: "Git email",
        desc: "Email used for Git commits.",
        group: "Git",
        placeholder: "daniel@example.com",
        default: "",
        choices: &[],
    },
    VarSpec {
        name: "git_branch",
        label: "Default branch",
        desc: "Primary branch name (main/master).",
        group: "Git",
        placeholder: "main",
        default: "main",
        choices: &[],
    },
    VarSpec {
        name: "git_remote",
        label: "Remote name",
        desc: "Name of the primary Git remote.",
        group: "Git",
        placeholder: "origin",
        default: "origin",
        choices: &[],
    },
    VarSpec {
        name: "docker_registry",
        label: "Docker registry",
        desc: "URL of the image registry.",
        group: "Docker",
        placeholder: "docker.io/username",
        default: "",
        choices: &[],
    },
    VarSpec {
        name: "docker_prefix",
        label: "Image prefix",
        desc: "Prefix for image names.",
        group: "Docker",
        placeholder: "galindo",
        default: "",
        choices: &[],
    },
    VarSpec {
        name: "pkg_manager",
        label: "Package manager",
        desc: "Node package manager.",
        group: "Node.js",
        placeholder: "npm",
        default: "npm",
        choices: &["npm", "yarn", "pnpm"],
    },
    VarSpec {
        name: "editor",
        label: "Editor",
        desc: "Preferred code editor.",
        group: "General",
        placeholder: "code",
        default: "code",
        choices: &["code", "vim", "nano", "nvim", "cursor"],
    },
    VarSpec {
        name: "shell",
        label: "Shell",
        desc: "Preferred shell.",
        group: "General",
        placeholder: "zsh",
        default: "zsh",
        choices: &["bash", "zsh", "fish", "powershell"],
    },
    VarSpec {
        name: "cf_tunnel_name",
        label: "Cloudflare tunnel",
        desc: "Name of the Cloudflare tunnel.",
        group: "Cloudflare",
        placeholder: "my-tunnel",
        default: "",
        choices: &[],
    },
];

/// Looks a variable up by its canonical name.
pub fn lookup(name: &str) -> Option<&'static VarSpec> {
    VAR_SCHEMA.iter().find(|spec| spec.name == name)
}

/// Whether `name` is a legal variable name. Scope validation drops everything
/// for which this returns false.
pub fn is_known(name: &str) -> bool {
    lookup(name).is_some()
}

/// The display label for a variable, falling back to the raw name for keys
/// that are not (or no longer) part of the schema.
pub fn label_for(name: &str) -> &str {
    lookup(name).map_or(name, |spec| spec.label)
}

/// The fully populated default variable map for the global scope.
/// Every schema key is present; the `shell` default is platform-dependent.
pub fn default_vars() -> BTreeMap<String, String> {
    VAR_SCHEMA
        .iter()
        .map(|spec| {
            let value = if spec.name == "shell" && cfg!(target_os = "windows") {
                "powershell"
            } else {
                spec.default
            };
            (spec.name.to_string(), value.to_string())
        })
        .collect()
}

/// The distinct variable groups, in schema order. Drives the setup wizard.
pub fn groups() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for spec in VAR_SCHEMA {
        if !seen.contains(&spec.group) {
            seen.push(spec.group);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vars_covers_every_schema_key() {
        let defaults = default_vars();
        assert_eq!(defaults.len(), VAR_SCHEMA.len());
        for spec in VAR_SCHEMA {
            assert!(defaults.contains_key(spec.name), "missing {}", spec.name);
        }
    }

    #[test]
    fn defaults_with_choices_are_members_of_their_choice_set() {
        for spec in VAR_SCHEMA.iter().filter(|s| !s.choices.is_empty()) {
            assert!(
                spec.choices.contains(&spec.default),
                "default '{}' of '{}' is not a listed choice",
                spec.default,
                spec.name
            );
        }
    }

    #[test]
    fn lookup_distinguishes_known_from_unknown() {
        assert!(is_known("git_branch"));
        assert!(!is_known("git_branhc"));
        assert_eq!(label_for("pkg_manager"), "Package manager");
        assert_eq!(label_for("no_such_var"), "no_such_var");
    }

    #[test]
    fn groups_preserve_schema_order_without_duplicates() {
        let groups = groups();
        assert_eq!(
            groups,
            vec!["Tailscale / SSH", "Git", "Docker", "Node.js", "General", "Cloudflare"]
        );
    }
}
