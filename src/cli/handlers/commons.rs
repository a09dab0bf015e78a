// src/cli/handlers/commons.rs

// This module contains shared functions used by multiple handlers.

use anyhow::{Result, anyhow};
use colored::{Color, Colorize};
use dialoguer::{Confirm, theme::ColorfulTheme};
use std::path::Path;

use crate::core::{catalog, scanner, schema, store::ConfigStore};
use crate::models::{CommandGroup, CommandSpec, ExecOutcome, HostOs, LogKind, LogLine};

/// Expands `~` and environment variables in a user-supplied project path and
/// canonicalizes it, so one project always maps to one scope key.
pub fn resolve_project_path(path: &str) -> Result<String> {
    let expanded = shellexpand::full(path)
        .map_err(|e| anyhow!("Could not expand path '{path}': {e}"))?
        .into_owned();
    let canonical = dunce::canonicalize(&expanded)
        .map_err(|e| anyhow!("Project path '{expanded}' is not accessible: {e}"))?;
    Ok(canonical.to_string_lossy().into_owned())
}

/// All command groups applicable to a scope: catalog groups driven by the
/// project's marker files, the always-available remote and system groups,
/// and a trailing group holding the scope's custom commands.
pub fn command_groups(store: &ConfigStore, project: Option<&str>) -> Vec<CommandGroup> {
    let files = project
        .and_then(|p| scanner::scan_dir(Path::new(p)).ok())
        .unwrap_or_default();
    let mut groups = catalog::all_groups(&files, HostOs::detect());

    let doc = store.read();
    let mut custom: Vec<CommandSpec> = doc
        .global
        .custom_commands
        .iter()
        .map(CommandSpec::from)
        .collect();
    if let Some(path) = project
        && let Some(scope) = doc.projects.get(path)
    {
        custom.extend(scope.custom_commands.iter().map(CommandSpec::from));
    }
    if !custom.is_empty() {
        groups.push(CommandGroup {
            category: "Custom".to_string(),
            icon: "🧩",
            color: Color::Magenta,
            commands: custom,
        });
    }
    groups
}

/// Asks a yes/no question, defaulting to no.
pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt.to_string())
        .default(false)
        .interact()?)
}

/// Renders one execution-log line with its stream color.
pub fn print_log_line(line: &LogLine) {
    let time = line.time.dimmed();
    match line.kind {
        LogKind::Command => println!("{} {}", time, line.text.cyan().bold()),
        LogKind::Info => println!("{} {}", time, line.text.dimmed()),
        LogKind::Output => println!("{} {}", time, line.text),
        LogKind::Error => println!("{} {}", time, line.text.red()),
        LogKind::Success => println!("{} {}", time, line.text.green()),
        LogKind::Divider => println!("{}", line.text.dimmed()),
    }
}

/// Points the user at configuration when required variables are missing.
pub fn print_missing_vars(missing: &[String]) {
    let labels: Vec<&str> = missing.iter().map(|name| schema::label_for(name)).collect();
    println!("{} {}", "Configure first:".yellow().bold(), labels.join(", "));
    for name in missing {
        println!("  {} commanddock vars set {} <value>", "→".dimmed(), name);
    }
}

/// Prints the final verdict line for an invocation outcome.
pub fn report_outcome(outcome: &ExecOutcome) {
    match outcome {
        ExecOutcome::MissingVars(missing) => print_missing_vars(missing),
        ExecOutcome::AwaitingConfirmation => {}
        ExecOutcome::DryPreview { resolved } => {
            println!("{} {}", "Dry run:".blue().bold(), resolved);
        }
        ExecOutcome::Completed { exit_code: 0, elapsed_ms, .. } => {
            println!("{} {}", "✓".green().bold(), format!("Completed in {elapsed_ms} ms").green());
        }
        ExecOutcome::Completed { exit_code, .. } => {
            println!("{} Command failed (exit {exit_code})", "✗".red().bold());
        }
        ExecOutcome::SpawnFailed { message, .. } => {
            println!("{} {}", "✗".red().bold(), message.red());
        }
    }
}
