use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use dialoguer::{Input, Select, theme::ColorfulTheme};

use crate::{
    cli::handlers::commons,
    core::{schema, store::ConfigStore},
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "First-run wizard: walks the variable groups and fills the global scope."
)]
struct SetupArgs {
    /// Accept the schema defaults without asking anything.
    #[arg(long)]
    defaults: bool,

    /// Run the wizard again even though setup was already completed.
    #[arg(long)]
    force: bool,
}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    let setup_args = SetupArgs::try_parse_from(&args)?;

    let doc = store.read();
    if doc.setup_done && !setup_args.force {
        println!(
            "Setup was already completed. Re-run with {} to change everything,\n\
             or edit single values with {}.",
            "--force".bold(),
            "commanddock vars set <name> <value>".bold()
        );
        return Ok(());
    }

    if setup_args.defaults {
        store.set_setup_done(true);
        println!("{} Using schema defaults for every variable.", "Done.".green().bold());
        return Ok(());
    }

    println!(
        "{}\n{}",
        "Welcome to CommandDock.".bold(),
        "Leave a field empty to keep it unset; commands that need it will tell you.".dimmed()
    );

    let theme = ColorfulTheme::default();
    let current = store.resolved_vars(None);

    for group in schema::groups() {
        println!("\n{}", group.cyan().bold());
        for spec in schema::VAR_SCHEMA.iter().filter(|s| s.group == group) {
            let existing = current.get(spec.name).map(String::as_str).unwrap_or("");

            let value = if spec.choices.is_empty() {
                Input::<String>::with_theme(&theme)
                    .with_prompt(format!("{} ({})", spec.label, spec.desc))
                    .with_initial_text(existing.to_string())
                    .allow_empty(true)
                    .interact_text()?
            } else {
                let default_index = spec
                    .choices
                    .iter()
                    .position(|c| *c == existing)
                    .unwrap_or(0);
                let selected = Select::with_theme(&theme)
                    .with_prompt(spec.label.to_string())
                    .items(spec.choices)
                    .default(default_index)
                    .interact()?;
                spec.choices.get(selected).copied().unwrap_or(spec.default).to_string()
            };

            if value != existing {
                store.set_global_var(spec.name, &value)?;
            }
        }
    }

    let workspace: String = Input::with_theme(&theme)
        .with_prompt("Workspace root to scan for projects (optional)")
        .with_initial_text(store.read().workspace_root)
        .allow_empty(true)
        .interact_text()?;
    if !workspace.is_empty() {
        match commons::resolve_project_path(&workspace) {
            Ok(root) => {
                store.set_workspace_root(&root);
            }
            Err(e) => println!("{} {e}", "Note:".yellow().bold()),
        }
    }

    store.set_setup_done(true);
    println!(
        "\n{} Try {} next.",
        "Setup complete.".green().bold(),
        "commanddock scan".bold()
    );
    Ok(())
}
