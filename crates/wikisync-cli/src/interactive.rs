//! Terminal confirmation gate
//!
//! Uses dialoguer for the two confirmations a sync asks for.

use dialoguer::Confirm;
use wikisync_core::{ConfirmationGate, Result, SyncPlan};

use crate::output;

/// Gate that prints the colored preview and asks on the terminal
#[derive(Debug, Clone, Copy)]
pub struct TerminalGate {
    /// Answer yes without asking
    pub assume_yes: bool,
    /// Skip the preview, for JSON output
    pub quiet: bool,
}

impl TerminalGate {
    fn ask(&self, prompt: String) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|err| wikisync_core::Error::Io(std::io::Error::other(err.to_string())))
    }
}

impl ConfirmationGate for TerminalGate {
    fn present(&mut self, plan: &SyncPlan) {
        if !self.quiet {
            output::print_preview(plan);
        }
    }

    fn confirm_apply(&mut self, plan: &SyncPlan) -> Result<bool> {
        let creates = plan.creates().count();
        let updates = plan.updates().count();
        self.ask(format!("Create {creates} and update {updates} page(s)?"))
    }

    fn confirm_deletes(&mut self, plan: &SyncPlan) -> Result<bool> {
        self.ask(format!("Delete {} page(s)?", plan.deletes.len()))
    }
}
