// src/bin/commanddock.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use commanddock::{
    cli::{Cli, handlers},
    core::store::ConfigStore,
};

// --- Command Definition and Registry ---

/// Defines a system command, its aliases, and its handler function.
/// The handler signature is kept consistent across all commands for
/// simplicity in the registry.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    summary: &'static str,
    handler: fn(Vec<String>, &ConfigStore) -> Result<()>,
}

/// The single source of truth for all commands. To add a new command, add a
/// new entry to this static array.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "custom",
        aliases: &[],
        summary: "Manage user-defined command templates",
        handler: handlers::custom::handle,
    },
    CommandDefinition {
        name: "fav",
        aliases: &[],
        summary: "Toggle or list favorite commands",
        handler: handlers::fav::handle,
    },
    CommandDefinition {
        name: "history",
        aliases: &["hist"],
        summary: "Show, re-run or clear executed commands",
        handler: handlers::history::handle,
    },
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        summary: "List the commands available for a project",
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "probe",
        aliases: &[],
        summary: "Check SSH reachability or the git identity",
        handler: handlers::probe::handle,
    },
    CommandDefinition {
        name: "recent",
        aliases: &[],
        summary: "List recently opened projects",
        handler: handlers::recent::handle,
    },
    CommandDefinition {
        name: "reset",
        aliases: &[],
        summary: "Replace the configuration with fresh defaults",
        handler: handlers::reset::handle,
    },
    CommandDefinition {
        name: "run",
        aliases: &[],
        summary: "Resolve and execute a command",
        handler: handlers::run::handle,
    },
    CommandDefinition {
        name: "scan",
        aliases: &[],
        summary: "Scan a workspace root for projects",
        handler: handlers::scan::handle,
    },
    CommandDefinition {
        name: "setup",
        aliases: &[],
        summary: "First-run configuration wizard",
        handler: handlers::setup::handle,
    },
    CommandDefinition {
        name: "ui",
        aliases: &[],
        summary: "Toggle dry-run mode and collapsed groups",
        handler: handlers::ui::handle,
    },
    CommandDefinition {
        name: "vars",
        aliases: &["var"],
        summary: "Show or edit configuration variables",
        handler: handlers::vars::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// The main entry point. Sets up logging, builds the store at the standard
/// per-user location (the composition root owns it and passes it down by
/// reference), dispatches to the handler, and performs centralized error
/// handling.
fn main() {
    env_logger::init();

    let store = match ConfigStore::open_default() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_cli(Cli::parse(), &store) {
        eprintln!("\n{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli, store: &ConfigStore) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let Some(action) = cli.action else {
        print_overview(store);
        return Ok(());
    };

    let Some(command) = find_command(&action) else {
        return Err(anyhow::anyhow!(
            "Unknown command '{action}'. Run `commanddock` with no arguments for an overview."
        ));
    };

    // Nudge fresh installs toward the wizard, without blocking anything.
    if command.name != "setup" && command.name != "reset" && !store.read().setup_done {
        println!(
            "{}",
            "Tip: run `commanddock setup` once to configure your variables.".dimmed()
        );
    }

    (command.handler)(cli.args, store)
}

fn print_overview(store: &ConfigStore) {
    let doc = store.read();

    println!(
        "{} - scoped developer configuration and command dispatch.\n",
        "CommandDock".bold()
    );
    println!("{}", "Commands:".yellow().bold());
    for command in COMMAND_REGISTRY {
        let aliases = if command.aliases.is_empty() {
            String::new()
        } else {
            format!(" ({})", command.aliases.join(", "))
        };
        println!(
            "  {:<9}{:<8} {}",
            command.name.cyan(),
            aliases.dimmed(),
            command.summary
        );
    }

    if !doc.recent_projects.is_empty() {
        println!("\n{}", "Recent projects:".yellow().bold());
        for path in doc.recent_projects.iter().take(5) {
            println!("  {path}");
        }
    }
    if doc.ui.dry_run {
        println!(
            "\n{}",
            "Dry-run mode is ON: commands are logged, not executed.".yellow()
        );
    }
}
