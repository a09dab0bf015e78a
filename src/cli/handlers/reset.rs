use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::{cli::handlers::commons, core::store::ConfigStore};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Replaces the whole configuration with a fresh default document."
)]
struct ResetArgs {
    /// Skip the confirmation prompt.
    #[arg(long, short)]
    yes: bool,
}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    let reset_args = ResetArgs::try_parse_from(&args)?;

    println!(
        "{}",
        "This discards every variable, custom command, favorite and history entry."
            .red()
            .bold()
    );
    if !reset_args.yes && !commons::confirm("Reset the configuration?")? {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    store.reset();
    println!(
        "{} A fresh document was written to '{}'.",
        "Reset.".green().bold(),
        store.file_path().display()
    );
    Ok(())
}
