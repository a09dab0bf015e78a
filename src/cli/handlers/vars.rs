use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;

use crate::{
    cli::handlers::commons,
    core::{schema, store::ConfigStore},
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Shows or edits configuration variables, globally or per project."
)]
struct VarsArgs {
    /// What to do: list (default), set, unset.
    action: Option<String>,

    /// Variable name (for set/unset).
    name: Option<String>,

    /// New value (for set).
    value: Option<String>,

    /// Operate on this project's override scope instead of the global scope.
    #[arg(long, short)]
    project: Option<String>,
}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    let vars_args = VarsArgs::try_parse_from(&args)?;
    let project = vars_args
        .project
        .as_deref()
        .map(commons::resolve_project_path)
        .transpose()?;

    match vars_args.action.as_deref().unwrap_or("list") {
        "list" => list(store, project.as_deref()),
        "set" => {
            let name = vars_args
                .name
                .ok_or_else(|| anyhow!("Usage: commanddock vars set <name> <value> [--project <path>]"))?;
            let value = vars_args.value.unwrap_or_default();
            set(store, project.as_deref(), &name, &value)
        }
        "unset" => {
            let name = vars_args
                .name
                .ok_or_else(|| anyhow!("Usage: commanddock vars unset <name> [--project <path>]"))?;
            unset(store, project.as_deref(), &name)
        }
        other => Err(anyhow!("Unknown vars action '{other}'. Use list, set or unset.")),
    }
}

fn list(store: &ConfigStore, project: Option<&str>) -> Result<()> {
    let doc = store.read();
    let effective = store.resolved_vars(project);
    let overrides = project.and_then(|p| doc.projects.get(p).map(|s| s.vars.clone()));

    if let Some(path) = project {
        println!("{} {}", "Scope:".bold(), path.dimmed());
    }

    for group in schema::groups() {
        println!("\n{}", group.cyan().bold());
        for spec in schema::VAR_SCHEMA.iter().filter(|s| s.group == group) {
            let value = effective.get(spec.name).map(String::as_str).unwrap_or("");
            let overridden = overrides
                .as_ref()
                .and_then(|vars| vars.get(spec.name))
                .is_some_and(|v| !v.is_empty());

            let shown = if value.is_empty() {
                format!("(unset, e.g. {})", spec.placeholder).dimmed().to_string()
            } else if overridden {
                format!("{value} {}", "(override)".yellow())
            } else {
                value.to_string()
            };
            println!("  {:<20} {:<18} {}", spec.name, spec.label.dimmed(), shown);
        }
    }
    Ok(())
}

fn set(store: &ConfigStore, project: Option<&str>, name: &str, value: &str) -> Result<()> {
    if let Some(spec) = schema::lookup(name)
        && !spec.choices.is_empty()
        && !value.is_empty()
        && !spec.choices.contains(&value)
    {
        println!(
            "{} '{}' is not one of the usual choices ({}).",
            "Note:".yellow().bold(),
            value,
            spec.choices.join(", ")
        );
    }

    match project {
        Some(path) => store.set_project_var(path, name, value)?,
        None => store.set_global_var(name, value)?,
    };
    println!(
        "{} {} = {}",
        "Saved".green().bold(),
        name,
        if value.is_empty() { "(empty)".dimmed().to_string() } else { value.to_string() }
    );
    Ok(())
}

fn unset(store: &ConfigStore, project: Option<&str>, name: &str) -> Result<()> {
    match project {
        Some(path) => {
            store.remove_project_var(path, name);
            println!("{} '{}' now inherits the global value.", "Cleared".green().bold(), name);
        }
        None => {
            // Unsetting a global variable restores its schema default.
            if !schema::is_known(name) {
                return Err(anyhow!("'{name}' is not a known configuration variable."));
            }
            let defaults = schema::default_vars();
            let default = defaults.get(name).map(String::as_str).unwrap_or("");
            store.set_global_var(name, default)?;
            println!(
                "{} '{}' restored to its default{}.",
                "Cleared".green().bold(),
                name,
                if default.is_empty() { String::new() } else { format!(" ('{default}')") }
            );
        }
    }
    Ok(())
}
