use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use crate::{cli::handlers::commons, core::scanner, core::store::ConfigStore};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Scans a workspace root and lists the projects and stacks found."
)]
struct ScanArgs {
    /// Workspace root to scan. Defaults to the remembered root, then the
    /// current directory.
    root: Option<String>,
}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    let scan_args = ScanArgs::try_parse_from(&args)?;

    let doc = store.read();
    let root = match scan_args.root {
        Some(root) => commons::resolve_project_path(&root)?,
        None if !doc.workspace_root.is_empty() => doc.workspace_root.clone(),
        None => std::env::current_dir()
            .map_err(|e| anyhow!("Could not determine the current directory: {e}"))?
            .to_string_lossy()
            .into_owned(),
    };

    let projects = scanner::scan_workspace(&PathBuf::from(&root))?;
    println!(
        "{} {} {}",
        "Found".bold(),
        projects.len().to_string().cyan().bold(),
        format!("projects under {root}").bold()
    );

    for project in &projects {
        let stacks = if project.stacks.is_empty() {
            "—".dimmed().to_string()
        } else {
            project.stacks.join(", ").cyan().to_string()
        };
        println!(
            "  {:<24} {}  {}",
            project.name.as_str().bold(),
            stacks,
            project.path.display().to_string().dimmed()
        );
    }

    // Remember this root as the workspace for the next scan.
    store.set_workspace_root(&root);
    Ok(())
}
