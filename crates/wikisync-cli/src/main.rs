//! wikisync CLI
//!
//! Mirrors a directory of Markdown documents onto a tree of wiki pages.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;
mod output;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Directory to wiki synchronization", "wikisync".green().bold());
            println!();
            println!("Run {} for available commands.", "wikisync --help".cyan());
            Ok(())
        }
    }
}

/// RUST_LOG wins unless --verbose asks for debug output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Sync {
            dir,
            target,
            dry_run,
            yes,
            json,
        } => commands::run_sync(&dir, &target, dry_run, yes, json),
        Commands::Plan { dir, target, json } => commands::run_plan(&dir, &target, json),
        Commands::History { dir, json } => commands::run_history(&dir, json),
    }
}
