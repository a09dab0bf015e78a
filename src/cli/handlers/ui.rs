use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;

use crate::core::store::ConfigStore;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Adjusts persisted UI state: dry-run mode and collapsed groups."
)]
struct UiArgs {
    /// What to change: show (default), dry-run, collapse.
    action: Option<String>,

    /// For dry-run: on|off. For collapse: the group name.
    first: Option<String>,

    /// For collapse: on|off.
    second: Option<String>,
}

fn parse_toggle(value: Option<&str>, what: &str) -> Result<bool> {
    match value {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(anyhow!("Expected 'on' or 'off' for {what}.")),
    }
}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    let ui_args = UiArgs::try_parse_from(&args)?;

    match ui_args.action.as_deref().unwrap_or("show") {
        "show" => {
            let doc = store.read();
            let dry = if doc.ui.dry_run { "on".yellow().bold() } else { "off".green() };
            println!("dry-run: {dry}");
            let collapsed: Vec<&String> = doc
                .ui
                .collapsed
                .iter()
                .filter(|(_, collapsed)| **collapsed)
                .map(|(group, _)| group)
                .collect();
            if !collapsed.is_empty() {
                println!("collapsed groups:");
                for group in collapsed {
                    println!("  - {group}");
                }
            }
            Ok(())
        }
        "dry-run" => {
            let enabled = parse_toggle(ui_args.first.as_deref(), "dry-run")?;
            store.set_dry_run(enabled);
            if enabled {
                println!(
                    "{} Commands will be resolved and logged, never executed.",
                    "Dry-run on.".yellow().bold()
                );
            } else {
                println!("{} Commands execute normally again.", "Dry-run off.".green().bold());
            }
            Ok(())
        }
        "collapse" => {
            let group = ui_args
                .first
                .ok_or_else(|| anyhow!("Usage: commanddock ui collapse <group> on|off"))?;
            let collapsed = parse_toggle(ui_args.second.as_deref(), "collapse")?;
            store.set_collapsed(&group, collapsed);
            println!(
                "Group '{}' is now {}.",
                group.bold(),
                if collapsed { "collapsed" } else { "expanded" }
            );
            Ok(())
        }
        other => Err(anyhow!("Unknown ui action '{other}'. Use show, dry-run or collapse.")),
    }
}
