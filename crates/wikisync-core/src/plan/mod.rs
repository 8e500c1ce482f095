//! Change planning
//!
//! Diffs the scanned tree against the resolved remote snapshot and produces
//! an ordered [`SyncPlan`].

pub mod order;
mod parent;
mod planner;

pub use parent::ParentResolver;
pub use planner::Planner;

use std::collections::BTreeSet;

use serde::Serialize;
use wikisync_fs::NormalizedPath;

use crate::remote::PageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    NoOp,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::NoOp => write!(f, "no-op"),
        }
    }
}

/// Why an existing page needs an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeReason {
    Title,
    Content,
    Parent,
}

impl std::fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Content => write!(f, "content"),
            Self::Parent => write!(f, "parent"),
        }
    }
}

/// One planned change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub kind: OperationKind,
    /// Source path; for deletes, the path decoded from the page's identity
    /// label when it has one
    pub local_path: Option<NormalizedPath>,
    pub remote_id: Option<PageId>,
    /// Title the page will carry after the operation
    pub title: String,
    /// Current remote title when an update renames the page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_title: Option<String>,
    #[serde(skip)]
    pub content: String,
    /// Path of the parent node; `None` means the sync root
    pub parent_path_key: Option<NormalizedPath>,
    pub change_reasons: BTreeSet<ChangeReason>,
    pub depth: usize,
    pub is_directory: bool,
    /// The page already carries the node's identity label
    pub has_identity_label: bool,
}

impl Operation {
    pub fn has_reason(&self, reason: ChangeReason) -> bool {
        self.change_reasons.contains(&reason)
    }

    /// Title or content must be written to the store.
    pub fn rewrites_page(&self) -> bool {
        self.has_reason(ChangeReason::Title) || self.has_reason(ChangeReason::Content)
    }

    /// Path used in logs and previews.
    pub fn display_path(&self) -> String {
        self.local_path
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Ordered set of changes for one run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlan {
    pub root_id: PageId,
    pub root_title: String,
    /// Creates and updates, in execution order
    pub apply: Vec<Operation>,
    /// Deletes, deepest first
    pub deletes: Vec<Operation>,
    /// Resolved nodes that need nothing; kept for reporting
    pub unchanged: Vec<Operation>,
}

impl SyncPlan {
    pub fn creates(&self) -> impl Iterator<Item = &Operation> {
        self.apply.iter().filter(|op| op.kind == OperationKind::Create)
    }

    pub fn updates(&self) -> impl Iterator<Item = &Operation> {
        self.apply.iter().filter(|op| op.kind == OperationKind::Update)
    }

    /// No mutation is planned.
    pub fn is_empty(&self) -> bool {
        self.apply.is_empty() && self.deletes.is_empty()
    }
}
