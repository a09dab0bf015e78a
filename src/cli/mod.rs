use clap::Parser;

pub mod handlers;

/// CommandDock: scoped developer configuration and command dispatch.
///
/// Settings live in two layers, global defaults and per-project overrides,
/// and parameterized command templates become concrete shell invocations,
/// with a confirmation gate for destructive operations and a global dry-run
/// mode.
#[derive(Parser, Debug)]
#[command(author, version, about, disable_help_subcommand = true)]
pub struct Cli {
    /// The action to perform (setup, scan, list, run, vars, custom, fav,
    /// history, recent, probe, ui, reset).
    pub action: Option<String>,

    /// Arguments passed through to the action handler.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
