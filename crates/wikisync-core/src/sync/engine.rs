//! SyncEngine implementation
//!
//! One run is strictly sequential: scan, fetch the remote subtree, resolve,
//! plan, confirm, apply, delete, write the ledger.

use std::path::{Path, PathBuf};

use wikisync_content::ContentTranscoder;

use super::report::SyncResult;
use crate::execute::ExecutionEngine;
use crate::gate::ConfirmationGate;
use crate::identity::{IdentityResolver, Resolutions};
use crate::ledger::{LedgerPage, RunLedger};
use crate::plan::{Planner, SyncPlan};
use crate::remote::{PageId, RemoteError, RemotePageStore, RemoteTree};
use crate::scan::{DEFAULT_EXTENSIONS, LocalTree, Scanner};
use crate::{Error, Result};

/// Settings for a run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Document extensions, lowercase, without the leading dot
    pub extensions: Vec<String>,
    /// Where to write the run ledger; `None` disables it
    pub ledger_dir: Option<PathBuf>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            ledger_dir: None,
        }
    }
}

/// Everything computed before the gate
struct PreparedRun {
    local: LocalTree,
    remote: RemoteTree,
    resolutions: Resolutions,
    plan: SyncPlan,
}

/// Mirrors a directory onto the pages under a root page
pub struct SyncEngine {
    store: Box<dyn RemotePageStore>,
    transcoder: Box<dyn ContentTranscoder>,
    gate: Box<dyn ConfirmationGate>,
    options: SyncOptions,
}

impl SyncEngine {
    pub fn new(
        store: Box<dyn RemotePageStore>,
        transcoder: Box<dyn ContentTranscoder>,
        gate: Box<dyn ConfirmationGate>,
    ) -> Self {
        Self {
            store,
            transcoder,
            gate,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Compute the plan for `directory` without touching the store.
    pub fn plan(&self, directory: &Path, root: &PageId) -> Result<SyncPlan> {
        Ok(self.prepare(directory, root)?.plan)
    }

    /// Synchronize `directory` into the subtree under `root`.
    ///
    /// A dry run presents the plan and returns its counts. Otherwise both
    /// confirmations are collected before the first write; declining either
    /// returns [`Error::Aborted`] with the store untouched.
    ///
    /// # Errors
    ///
    /// Fails before any write on an unusable directory, root page or
    /// credentials. A failed create or update is rolled back and returned.
    pub fn run(&mut self, directory: &Path, root: &PageId, dry_run: bool) -> Result<SyncResult> {
        let prepared = self.prepare(directory, root)?;
        let plan = &prepared.plan;

        self.gate.present(plan);
        if dry_run {
            tracing::info!("Dry run, nothing applied");
            return Ok(SyncResult::planned(plan));
        }
        if plan.is_empty() {
            tracing::info!("Remote pages already match the source directory");
            return Ok(SyncResult {
                skipped: plan.unchanged.len(),
                ..SyncResult::default()
            });
        }

        if !plan.apply.is_empty() && !self.gate.confirm_apply(plan)? {
            return Err(Error::Aborted { stage: "apply" });
        }
        if !plan.deletes.is_empty() && !self.gate.confirm_deletes(plan)? {
            return Err(Error::Aborted { stage: "delete" });
        }

        let existing = prepared.resolutions.page_map();
        let mut executor = ExecutionEngine::new(self.store.as_ref(), &prepared.remote, &existing);
        let applied = executor.apply(plan)?;
        let deleted = executor.delete(plan);

        let mut result = SyncResult {
            created: applied.created.len(),
            updated: applied.updated,
            deleted: deleted.deleted,
            skipped: plan.unchanged.len(),
            errors: deleted.errors,
            dry_run: false,
            ledger_path: None,
        };

        if !applied.created.is_empty()
            && let Some(dir) = &self.options.ledger_dir
        {
            let space = prepared.remote.root().space.clone();
            let pages = applied
                .created
                .iter()
                .map(|page| LedgerPage {
                    page_id: page.id.clone(),
                    title: page.title.clone(),
                    space: space.clone(),
                    version: page.version,
                })
                .collect();
            let ledger = RunLedger::new(
                plan.root_id.clone(),
                plan.root_title.clone(),
                prepared.local.source.clone(),
                pages,
            );
            match ledger.save(dir) {
                Ok(path) => result.ledger_path = Some(path),
                Err(err) => tracing::warn!(dir = %dir.display(), error = %err, "Could not write run ledger"),
            }
        }

        tracing::info!(
            created = result.created,
            updated = result.updated,
            deleted = result.deleted,
            skipped = result.skipped,
            errors = result.errors.len(),
            "Sync finished"
        );
        Ok(result)
    }

    fn prepare(&self, directory: &Path, root: &PageId) -> Result<PreparedRun> {
        let local = Scanner::new(self.transcoder.as_ref())
            .with_extensions(self.options.extensions.clone())
            .scan(directory)?;

        let pages = self.store.get_subtree(root).map_err(|err| match err {
            RemoteError::NotFound(id) => Error::InvalidRoot {
                id,
                reason: "the page does not exist or is not visible".to_string(),
            },
            other => Error::remote("fetch", root.as_str(), other),
        })?;
        let remote = RemoteTree::from_pages(root, pages)?;
        tracing::info!(root = %root, pages = remote.len(), "Fetched remote subtree");

        let resolutions = IdentityResolver::new(&remote).resolve(&local);
        let plan = Planner::new(&remote, &resolutions).plan(&local);

        Ok(PreparedRun {
            local,
            remote,
            resolutions,
            plan,
        })
    }
}
