use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use crate::{cli::handlers::commons, core::store::ConfigStore, system::probes};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Checks SSH reachability or the local git identity."
)]
struct ProbeArgs {
    /// What to probe: ssh or git.
    target: String,

    /// SSH user (defaults to the configured ssh_user).
    #[arg(long)]
    user: Option<String>,

    /// SSH host (defaults to the configured ssh_host).
    #[arg(long)]
    host: Option<String>,

    /// Project whose overrides (ssh) or directory (git) apply.
    #[arg(long, short)]
    project: Option<String>,
}

pub fn handle(args: Vec<String>, store: &ConfigStore) -> Result<()> {
    let probe_args = ProbeArgs::try_parse_from(&args)?;
    let project = probe_args
        .project
        .as_deref()
        .map(commons::resolve_project_path)
        .transpose()?;

    match probe_args.target.as_str() {
        "ssh" => {
            let vars = store.resolved_vars(project.as_deref());
            let user = probe_args
                .user
                .or_else(|| vars.get("ssh_user").cloned())
                .unwrap_or_default();
            let host = probe_args
                .host
                .or_else(|| vars.get("ssh_host").cloned())
                .unwrap_or_default();

            println!("Probing {}...", format!("{user}@{host}").bold());
            let probe = probes::test_ssh(&user, &host);
            if probe.success {
                println!("{} SSH connection works.", "✓".green().bold());
            } else {
                println!("{} SSH connection failed.", "✗".red().bold());
                if let Some(error) = &probe.error {
                    println!("  {}", error.red());
                }
                if !probe.stderr.is_empty() {
                    println!("  {}", probe.stderr.trim().dimmed());
                }
            }
            Ok(())
        }
        "git" => {
            let cwd = match project.as_deref() {
                Some(path) => PathBuf::from(path),
                None => std::env::current_dir()
                    .map_err(|e| anyhow!("Could not determine the current directory: {e}"))?,
            };
            let identity = probes::git_identity(&cwd);
            if identity.success {
                println!(
                    "{} git identity: {}",
                    "✓".green().bold(),
                    identity.email.bold()
                );
            } else {
                println!("{} No git identity configured here.", "✗".red().bold());
                if let Some(error) = &identity.error {
                    println!("  {}", error.dimmed());
                }
            }
            Ok(())
        }
        other => Err(anyhow!("Unknown probe '{other}'. Use ssh or git.")),
    }
}
