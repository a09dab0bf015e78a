use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};
use std::collections::BTreeMap;

use crate::{
    cli::handlers::commons,
    core::{
        catalog,
        controller::{ExecutionController, ShellRunner},
        resolver,
        store::ConfigStore,
    },
    models::ExecOutcome,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Resolves a cataloged or custom command and executes it."
)]
struct RunArgs {
    /// The command label as shown by `list`.
    label: String,

    /// Project directory whose overrides and catalog apply.
    #[arg(long, short)]
    project: Option<String>,

    /// Inline input for commands with a free-text slot (e.g. message="fix bug").
    #[arg(long, short, value_name = "KEY=VALUE")]
    input: Vec<String>,

    /// Confirm a destructive command up front instead of being prompted.
    #[arg(long, short)]
    yes: bool,

    /// Print the resolved command without executing anything.
    #[arg(long)]
    preview: bool,
}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    let run_args = RunArgs::try_parse_from(&args)?;
    let project = run_args
        .project
        .as_deref()
        .map(commons::resolve_project_path)
        .transpose()?;

    // Locate the command across every group the scope offers.
    let groups = commons::command_groups(store, project.as_deref());
    let (group, spec) = catalog::find_command(&groups, &run_args.label).ok_or_else(|| {
        anyhow!(
            "Unknown command '{}'. Use `commanddock list` to see what is available.",
            run_args.label
        )
    })?;
    let group_name = group.category.clone();
    let spec = spec.clone();

    let mut controller = ExecutionController::new(store, ShellRunner);

    if run_args.preview {
        println!("{}", controller.resolve_preview(&spec.cmd, project.as_deref()));
        return Ok(());
    }

    // Inline inputs are keyed by the owning group and label, so the same slot
    // name in two commands never collides.
    let key = resolver::input_key(&group_name, &spec.label);
    let mut inputs = BTreeMap::new();
    for raw in &run_args.input {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| anyhow!("Inline input '{raw}' must look like key=value."))?;
        inputs.insert(format!("{key}-{name}"), value.to_string());
    }
    if let Some(slot) = &spec.input {
        let full = format!("{key}-{slot}");
        if !inputs.contains_key(&full) {
            let value: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt(slot.to_string())
                .allow_empty(true)
                .interact_text()?;
            inputs.insert(full, value);
        }
    }

    let mut outcome = controller.execute(&spec, &group_name, project.as_deref(), &inputs);

    if outcome == ExecOutcome::AwaitingConfirmation {
        let prompt = format!("'{}' is destructive. Run it?", spec.label);
        if run_args.yes || commons::confirm(&prompt)? {
            outcome = controller
                .confirm_pending()
                .ok_or_else(|| anyhow!("No command was pending confirmation."))?;
        } else {
            controller.cancel_pending();
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
    }

    for line in controller.log() {
        commons::print_log_line(line);
    }
    commons::report_outcome(&outcome);

    if let Some(path) = &project {
        store.add_recent_project(path);
    }
    Ok(())
}
