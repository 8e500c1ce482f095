//! Applying a plan to the remote store
//!
//! Creates and updates run in plan order. The first failure among them rolls
//! back every page created so far and ends the run. Deletes run afterwards and
//! their failures are only collected.

mod attempt;
mod journal;

pub use attempt::{CreateAttempt, CreatedPage, collision_title, create_with_retry};
pub use journal::{
    JournalEntry, OperationRecord, OperationState, RollbackJournal, RollbackReport, RunState,
};

use std::collections::HashMap;

use wikisync_fs::NormalizedPath;

use crate::identity::IdentityLabel;
use crate::plan::{ChangeReason, Operation, OperationKind, ParentResolver, SyncPlan};
use crate::remote::{PageId, RemoteError, RemotePageStore, RemoteTree};
use crate::{Error, Result};

/// A page created by [`ExecutionEngine::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCreate {
    pub id: PageId,
    pub title: String,
    pub path: Option<NormalizedPath>,
    pub version: u32,
}

/// Result of the create/update batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub created: Vec<AppliedCreate>,
    pub updated: usize,
}

/// Result of the delete batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: usize,
    pub errors: Vec<String>,
}

/// Applies planned operations against a store
pub struct ExecutionEngine<'a> {
    store: &'a dyn RemotePageStore,
    parents: ParentResolver<'a>,
    labels_enabled: bool,
    moves_enabled: bool,
    max_label_len: usize,
    created: HashMap<NormalizedPath, PageId>,
    journal: RollbackJournal,
    records: Vec<OperationRecord>,
    state: RunState,
}

impl<'a> ExecutionEngine<'a> {
    /// `existing` maps resolved node paths to their pre-existing pages.
    pub fn new(
        store: &'a dyn RemotePageStore,
        remote: &'a RemoteTree,
        existing: &'a HashMap<NormalizedPath, PageId>,
    ) -> Self {
        let capabilities = store.capabilities();
        if !capabilities.labels {
            tracing::warn!("Remote store does not support labels, pages are matched by title only");
        }
        Self {
            store,
            parents: ParentResolver::new(remote, existing),
            labels_enabled: capabilities.labels,
            moves_enabled: capabilities.move_pages,
            max_label_len: capabilities.max_label_len,
            created: HashMap::new(),
            journal: RollbackJournal::new(),
            records: Vec::new(),
            state: RunState::Running,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn records(&self) -> &[OperationRecord] {
        &self.records
    }

    /// Labels are still being written this run.
    pub fn labels_enabled(&self) -> bool {
        self.labels_enabled
    }

    /// Apply the create/update batch.
    ///
    /// # Errors
    ///
    /// The first failing create or update rolls back the pages created so far
    /// and its error is returned.
    pub fn apply(&mut self, plan: &SyncPlan) -> Result<ApplyOutcome> {
        self.records = plan
            .apply
            .iter()
            .map(|op| OperationRecord {
                kind: op.kind,
                path: op.local_path.clone(),
                title: op.title.clone(),
                state: OperationState::Pending,
            })
            .collect();

        let root_title = Some(plan.root_title.as_str());
        let mut outcome = ApplyOutcome::default();

        for (idx, op) in plan.apply.iter().enumerate() {
            self.records[idx].state = OperationState::Applying;
            let result = match op.kind {
                OperationKind::Create => self.apply_create(op, root_title).map(|page| {
                    outcome.created.push(page);
                }),
                OperationKind::Update => self.apply_update(op).map(|()| outcome.updated += 1),
                OperationKind::Delete | OperationKind::NoOp => Ok(()),
            };

            if let Err(err) = result {
                self.records[idx].state = OperationState::Failed;
                self.state = RunState::Failed;
                tracing::error!(
                    operation = %op.kind,
                    path = %op.display_path(),
                    title = %op.title,
                    error = %err,
                    "Operation failed, rolling back"
                );
                let report = self.journal.rollback(self.store);
                if !report.is_clean() {
                    tracing::warn!(
                        left_behind = ?report.failed,
                        "Some created pages could not be rolled back"
                    );
                }
                return Err(err);
            }
            self.records[idx].state = OperationState::Applied;
        }

        self.state = RunState::Completed;
        Ok(outcome)
    }

    /// Apply the delete batch; failures are logged and collected.
    pub fn delete(&mut self, plan: &SyncPlan) -> DeleteOutcome {
        let mut outcome = DeleteOutcome::default();
        for op in &plan.deletes {
            let Some(id) = op.remote_id.as_ref() else {
                continue;
            };
            match self.store.delete(id) {
                Ok(true) => {
                    tracing::debug!(page = %id, title = %op.title, "Deleted page");
                    outcome.deleted += 1;
                }
                Ok(false) => tracing::debug!(page = %id, title = %op.title, "Page already gone"),
                Err(err) => {
                    tracing::warn!(page = %id, title = %op.title, error = %err, "Delete failed, continuing");
                    outcome.errors.push(format!("delete \"{}\" ({id}): {err}", op.title));
                }
            }
        }
        outcome
    }

    fn apply_create(&mut self, op: &Operation, root_title: Option<&str>) -> Result<AppliedCreate> {
        let parent = self.parents.resolve(op, &self.created);
        let page = create_with_retry(self.store, &parent, &op.title, &op.content, root_title)?;
        tracing::info!(page = %page.id, title = %page.title, path = %op.display_path(), "Created page");

        self.journal.record(JournalEntry {
            id: page.id.clone(),
            title: page.title.clone(),
            path: op.local_path.clone(),
        });
        if let Some(path) = &op.local_path {
            self.created.insert(path.clone(), page.id.clone());
            self.attach_label(&page.id, path, false);
        }

        Ok(AppliedCreate {
            id: page.id,
            title: page.title,
            path: op.local_path.clone(),
            version: 1,
        })
    }

    fn apply_update(&mut self, op: &Operation) -> Result<()> {
        let Some(id) = op.remote_id.as_ref() else {
            return Err(Error::Transport {
                operation: "update",
                title: op.title.clone(),
                message: "no remote page to update".to_string(),
            });
        };

        if op.rewrites_page() {
            let version = self
                .store
                .update(id, &op.title, &op.content)
                .map_err(|err| Error::remote("update", &op.title, err))?;
            tracing::info!(page = %id, title = %op.title, version, reasons = ?op.change_reasons, "Updated page");
        }

        if op.has_reason(ChangeReason::Parent) {
            self.move_page(op, id);
        }

        if !op.has_identity_label
            && let Some(path) = &op.local_path
        {
            self.attach_label(id, path, true);
        }
        Ok(())
    }

    fn move_page(&mut self, op: &Operation, id: &PageId) {
        if !self.moves_enabled {
            tracing::warn!(page = %id, title = %op.title, "Remote store cannot move pages, leaving page in place");
            return;
        }
        let parent = self.parents.resolve(op, &self.created);
        match self.store.update_parent(id, &parent) {
            Ok(_) => tracing::info!(page = %id, parent = %parent, "Moved page"),
            Err(RemoteError::NotSupported { .. }) => {
                tracing::warn!("Remote store cannot move pages, parents will not be corrected this run");
                self.moves_enabled = false;
            }
            Err(err) => {
                tracing::warn!(page = %id, parent = %parent, error = %err, "Moving page failed, leaving it in place");
            }
        }
    }

    /// Best-effort identity label attachment.
    fn attach_label(&mut self, id: &PageId, path: &NormalizedPath, check_existing: bool) {
        if !self.labels_enabled {
            return;
        }
        let label = IdentityLabel::for_path(path);
        if !label.fits(self.max_label_len) {
            tracing::warn!(
                %path,
                len = label.len(),
                max = self.max_label_len,
                "Identity label too long, page will be matched by title"
            );
            return;
        }

        if check_existing {
            match self.store.get_labels(id) {
                Ok(labels) if labels.contains(label.as_str()) => return,
                Ok(_) => {}
                Err(err) => {
                    self.label_failed(id, err);
                    return;
                }
            }
        }

        match self.store.set_label(id, label.as_str()) {
            Ok(_) => tracing::debug!(page = %id, %label, "Attached identity label"),
            Err(err) => self.label_failed(id, err),
        }
    }

    fn label_failed(&mut self, id: &PageId, err: RemoteError) {
        match err {
            RemoteError::NotSupported { .. } => {
                tracing::warn!("Remote store does not support labels, pages are matched by title only");
                self.labels_enabled = false;
            }
            other => tracing::warn!(page = %id, error = %other, "Attaching identity label failed"),
        }
    }
}
