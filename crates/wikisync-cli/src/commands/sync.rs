//! Sync and plan command implementations

use std::path::Path;

use colored::Colorize;
use wikisync_core::{FixedAnswers, SyncResult};

use crate::cli::TargetArgs;
use crate::context::RunContext;
use crate::error::Result;
use crate::interactive::TerminalGate;
use crate::output;

/// Run the sync command
///
/// Previews the plan, asks for both confirmations unless `yes`, then applies.
pub fn run_sync(dir: &Path, target: &TargetArgs, dry_run: bool, yes: bool, json: bool) -> Result<()> {
    let context = RunContext::load(dir, target)?;
    if !json {
        println!(
            "{} Synchronizing {} under page {}...",
            "=>".blue().bold(),
            dir.display().to_string().cyan(),
            context.root.to_string().cyan()
        );
    }

    let gate = TerminalGate {
        assume_yes: yes,
        quiet: json,
    };
    let mut engine = context.engine(gate)?;
    let result = engine.run(&context.dir, &context.root, dry_run)?;
    report(&result, json)
}

/// Run the plan command
///
/// Same as `sync --dry-run`, but `--json` prints the full plan.
pub fn run_plan(dir: &Path, target: &TargetArgs, json: bool) -> Result<()> {
    let context = RunContext::load(dir, target)?;

    if json {
        let engine = context.engine(FixedAnswers::no())?;
        let plan = engine.plan(&context.dir, &context.root)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let gate = TerminalGate {
        assume_yes: false,
        quiet: false,
    };
    let mut engine = context.engine(gate)?;
    let result = engine.run(&context.dir, &context.root, true)?;
    report(&result, false)
}

fn report(result: &SyncResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        output::print_result(result);
    }
    Ok(())
}
