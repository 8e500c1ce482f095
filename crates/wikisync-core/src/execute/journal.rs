//! Per-run operation log and rollback of created pages

use serde::Serialize;
use wikisync_fs::NormalizedPath;

use crate::plan::OperationKind;
use crate::remote::{PageId, RemotePageStore};

/// Lifecycle of a single operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationState {
    Pending,
    Applying,
    Applied,
    Failed,
}

/// Lifecycle of a whole apply phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationRecord {
    pub kind: OperationKind,
    pub path: Option<NormalizedPath>,
    pub title: String,
    pub state: OperationState,
}

/// A page created during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub id: PageId,
    pub title: String,
    pub path: Option<NormalizedPath>,
}

/// Outcome of undoing a failed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    pub deleted: Vec<PageId>,
    /// Pages that could not be removed, with the reason
    pub failed: Vec<(PageId, String)>,
}

impl RollbackReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Records pages created so a failed run can remove them again
#[derive(Debug, Clone, Default)]
pub struct RollbackJournal {
    entries: Vec<JournalEntry>,
}

impl RollbackJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete every recorded page, newest first.
    ///
    /// Failures are collected, never raised.
    pub fn rollback(&mut self, store: &dyn RemotePageStore) -> RollbackReport {
        let mut report = RollbackReport::default();
        tracing::warn!(pages = self.entries.len(), "Rolling back pages created by this run");

        while let Some(entry) = self.entries.pop() {
            match store.delete(&entry.id) {
                Ok(_) => {
                    tracing::debug!(page = %entry.id, title = %entry.title, "Rolled back page");
                    report.deleted.push(entry.id);
                }
                Err(err) => {
                    tracing::warn!(page = %entry.id, title = %entry.title, error = %err, "Rollback delete failed");
                    report.failed.push((entry.id, err.to_string()));
                }
            }
        }
        report
    }
}
