use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;

use crate::{
    cli::handlers::commons,
    core::{
        controller::{ExecutionController, ShellRunner},
        store::ConfigStore,
    },
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Shows, re-runs or clears the execution history."
)]
struct HistoryArgs {
    /// What to do: list (default), run, clear.
    action: Option<String>,

    /// 1-based index into the listing (for run).
    index: Option<usize>,

    /// Project directory to run in (for run).
    #[arg(long, short)]
    project: Option<String>,
}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    let history_args = HistoryArgs::try_parse_from(&args)?;
    let project = history_args
        .project
        .as_deref()
        .map(commons::resolve_project_path)
        .transpose()?;

    let mut controller = ExecutionController::new(store, ShellRunner);

    match history_args.action.as_deref().unwrap_or("list") {
        "list" => {
            let entries = controller.recent_history();
            if entries.is_empty() {
                println!("No commands have been executed yet.");
                return Ok(());
            }
            for (i, entry) in entries.iter().enumerate() {
                println!(
                    "  {:>3}. {} {} {}",
                    i + 1,
                    entry.timestamp.as_str().dimmed(),
                    format!("[{}]", entry.os).dimmed(),
                    entry.cmd
                );
            }
            Ok(())
        }
        "run" => {
            let index = history_args
                .index
                .ok_or_else(|| anyhow!("Usage: commanddock history run <index>"))?;
            let entries = controller.recent_history();
            let entry = index
                .checked_sub(1)
                .and_then(|i| entries.get(i))
                .ok_or_else(|| anyhow!("History has no entry #{index}."))?
                .clone();

            println!("{} {}", "Re-running:".bold(), entry.cmd);
            let outcome = controller.run_from_history(&entry.cmd, project.as_deref());
            for line in controller.log() {
                commons::print_log_line(line);
            }
            commons::report_outcome(&outcome);
            Ok(())
        }
        "clear" => {
            store.clear_history();
            println!("{}", "History cleared.".green().bold());
            Ok(())
        }
        other => Err(anyhow!("Unknown history action '{other}'. Use list, run or clear.")),
    }
}
