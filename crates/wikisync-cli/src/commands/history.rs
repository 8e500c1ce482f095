//! History command implementation

use std::path::Path;

use wikisync_core::RunLedger;

use crate::context::{ensure_directory, resolver};
use crate::error::Result;
use crate::output;

/// Run the history command
///
/// Lists the run ledgers in the configured ledger directory, newest first.
pub fn run_history(dir: &Path, json: bool) -> Result<()> {
    ensure_directory(dir)?;
    let config = resolver(dir).resolve()?;
    let ledgers = RunLedger::list(&config.ledger_dir)?;

    if json {
        let entries: Vec<&RunLedger> = ledgers.iter().map(|(_, ledger)| ledger).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        output::print_history(&config.ledger_dir, &ledgers);
    }
    Ok(())
}
