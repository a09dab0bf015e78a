use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::{cli::handlers::commons, core::store::ConfigStore};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Lists the commands available for a project (or globally)."
)]
struct ListArgs {
    /// Project directory; its marker files select the catalog groups.
    project: Option<String>,

    /// Include groups the UI has collapsed.
    #[arg(long, short)]
    all: bool,
}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    let list_args = ListArgs::try_parse_from(&args)?;
    let project = list_args
        .project
        .as_deref()
        .map(commons::resolve_project_path)
        .transpose()?;

    if let Some(path) = &project {
        store.add_recent_project(path);
        println!("{} {}", "Project:".bold(), path.as_str().dimmed());
    }

    let doc = store.read();
    let mut favorites: Vec<String> = doc.global.favorites.clone();
    if let Some(path) = &project
        && let Some(scope) = doc.projects.get(path)
    {
        favorites.extend(scope.favorites.iter().cloned());
    }

    let groups = commons::command_groups(store, project.as_deref());
    for group in &groups {
        println!(
            "\n{} {}",
            group.icon,
            group.category.color(group.color).bold()
        );

        let collapsed = doc.ui.collapsed.get(&group.category).copied().unwrap_or(false);
        if collapsed && !list_args.all {
            println!(
                "  {}",
                format!("(collapsed, {} commands, use --all to show)", group.commands.len()).dimmed()
            );
            continue;
        }

        for spec in &group.commands {
            let star = if favorites.iter().any(|f| f == &spec.cmd) { "★" } else { " " };
            let danger = if spec.danger { " ⚠".red().to_string() } else { String::new() };
            println!(
                "  {} {:<14} {}{}",
                star.yellow(),
                spec.label.bold(),
                spec.desc.as_str().dimmed(),
                danger
            );
            println!("      {}", spec.cmd.as_str().dimmed());
        }
    }

    println!(
        "\n{}",
        "Run one with: commanddock run <label> [--project <path>]".dimmed()
    );
    Ok(())
}
