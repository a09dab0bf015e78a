use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::{cli::handlers::commons, core::store::ConfigStore};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Toggles a command template in the favorites of a scope."
)]
struct FavArgs {
    /// The command template to toggle. With no template, lists favorites.
    template: Vec<String>,

    /// Operate on this project's scope instead of the global scope.
    #[arg(long, short)]
    project: Option<String>,
}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    let fav_args = FavArgs::try_parse_from(&args)?;
    let project = fav_args
        .project
        .as_deref()
        .map(commons::resolve_project_path)
        .transpose()?;

    if fav_args.template.is_empty() {
        let doc = store.read();
        let favorites = match project.as_deref() {
            Some(path) => doc.projects.get(path).map(|s| s.favorites.clone()).unwrap_or_default(),
            None => doc.global.favorites,
        };
        if favorites.is_empty() {
            println!("No favorites in this scope.");
        }
        for favorite in &favorites {
            println!("  {} {}", "★".yellow(), favorite);
        }
        return Ok(());
    }

    let template = fav_args.template.join(" ");
    if store.toggle_favorite(project.as_deref(), &template) {
        println!("{} {}", "★ Favorited".yellow().bold(), template);
    } else {
        println!("{} {}", "Unfavorited".dimmed(), template);
    }
    Ok(())
}
