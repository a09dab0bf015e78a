use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::core::store::ConfigStore;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists recently opened projects.")]
struct RecentArgs {}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    RecentArgs::try_parse_from(&args)?;

    let doc = store.read();
    if doc.recent_projects.is_empty() {
        println!("No recent projects. Open one with `commanddock list <path>`.");
        return Ok(());
    }
    for (i, path) in doc.recent_projects.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, path);
    }
    println!(
        "\n{}",
        format!("{} of at most 20 remembered projects.", doc.recent_projects.len()).dimmed()
    );
    Ok(())
}
