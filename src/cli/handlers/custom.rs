use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;

use crate::{
    cli::handlers::commons,
    core::{schema, store::ConfigStore},
    models::CustomCommand,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Manages user-defined command templates for a scope."
)]
struct CustomArgs {
    /// What to do: list (default), add, remove.
    action: Option<String>,

    /// The command label (for add/remove).
    label: Option<String>,

    /// The command template, may contain {{var}} placeholders (for add).
    #[arg(long)]
    cmd: Option<String>,

    /// Short description (for add).
    #[arg(long, default_value = "")]
    desc: String,

    /// Required variables, comma separated (for add).
    #[arg(long, value_delimiter = ',')]
    vars: Vec<String>,

    /// Operate on this project's scope instead of the global scope.
    #[arg(long, short)]
    project: Option<String>,
}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    let custom_args = CustomArgs::try_parse_from(&args)?;
    let project = custom_args
        .project
        .as_deref()
        .map(commons::resolve_project_path)
        .transpose()?;

    match custom_args.action.as_deref().unwrap_or("list") {
        "list" => {
            let doc = store.read();
            let scope = match project.as_deref() {
                Some(path) => doc.projects.get(path).cloned().unwrap_or_default(),
                None => doc.global,
            };
            if scope.custom_commands.is_empty() {
                println!("No custom commands in this scope.");
                return Ok(());
            }
            for command in &scope.custom_commands {
                println!("  {:<16} {}", command.label.bold(), command.desc.as_str().dimmed());
                println!("      {}", command.cmd.as_str().dimmed());
            }
            Ok(())
        }
        "add" => {
            let label = custom_args
                .label
                .ok_or_else(|| anyhow!("Usage: commanddock custom add <label> --cmd <template>"))?;
            let cmd = custom_args
                .cmd
                .ok_or_else(|| anyhow!("A custom command needs a --cmd template."))?;
            if label.is_empty() || cmd.is_empty() {
                return Err(anyhow!("Label and template must be non-empty."));
            }
            for name in custom_args.vars.iter().filter(|v| !schema::is_known(v.as_str())) {
                println!(
                    "{} '{}' is not a known variable; the command will always report it missing.",
                    "Note:".yellow().bold(),
                    name
                );
            }
            store.add_custom_command(
                project.as_deref(),
                CustomCommand {
                    label: label.clone(),
                    cmd,
                    desc: custom_args.desc,
                    vars: custom_args.vars,
                },
            );
            println!("{} custom command '{}'.", "Saved".green().bold(), label);
            Ok(())
        }
        "remove" => {
            let label = custom_args
                .label
                .ok_or_else(|| anyhow!("Usage: commanddock custom remove <label>"))?;
            if store.remove_custom_command(project.as_deref(), &label) {
                println!("{} custom command '{}'.", "Removed".green().bold(), label);
            } else {
                println!("No custom command labeled '{label}' in this scope.");
            }
            Ok(())
        }
        other => Err(anyhow!("Unknown custom action '{other}'. Use list, add or remove.")),
    }
}
