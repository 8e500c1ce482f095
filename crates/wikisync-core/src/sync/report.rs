//! Outcome of a sync run

use std::path::PathBuf;

use serde::Serialize;

use crate::plan::SyncPlan;

/// Counts reported by [`super::SyncEngine::run`]
///
/// For a dry run the counts are what the plan would do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Resolved nodes that needed no change
    pub skipped: usize,
    /// Non-fatal failures, such as deletes that did not go through
    pub errors: Vec<String>,
    pub dry_run: bool,
    /// Ledger written by the run, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,
}

impl SyncResult {
    /// Counts a plan would produce, without applying it.
    pub fn planned(plan: &SyncPlan) -> Self {
        Self {
            created: plan.creates().count(),
            updated: plan.updates().count(),
            deleted: plan.deletes.len(),
            skipped: plan.unchanged.len(),
            errors: Vec::new(),
            dry_run: true,
            ledger_path: None,
        }
    }

    /// Pages created, updated or deleted.
    pub fn changes(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
