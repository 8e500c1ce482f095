//! Plan preview and confirmation
//!
//! Nothing is written to the store until the gate has approved both the
//! create/update batch and the delete batch.

use std::fmt::Write as _;

use crate::Result;
use crate::plan::{Operation, SyncPlan};

/// Asks the user whether a plan may be applied.
pub trait ConfirmationGate {
    /// Show the plan before any question is asked.
    fn present(&mut self, plan: &SyncPlan);

    /// Approve the create/update batch.
    fn confirm_apply(&mut self, plan: &SyncPlan) -> Result<bool>;

    /// Approve the delete batch.
    fn confirm_deletes(&mut self, plan: &SyncPlan) -> Result<bool>;
}

/// Gate with preset answers, for `--yes` and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswers {
    pub apply: bool,
    pub deletes: bool,
}

impl FixedAnswers {
    pub fn yes() -> Self {
        Self {
            apply: true,
            deletes: true,
        }
    }

    pub fn no() -> Self {
        Self {
            apply: false,
            deletes: false,
        }
    }
}

impl ConfirmationGate for FixedAnswers {
    fn present(&mut self, plan: &SyncPlan) {
        tracing::debug!(preview = %render_preview(plan), "Plan preview");
    }

    fn confirm_apply(&mut self, _plan: &SyncPlan) -> Result<bool> {
        Ok(self.apply)
    }

    fn confirm_deletes(&mut self, _plan: &SyncPlan) -> Result<bool> {
        Ok(self.deletes)
    }
}

/// Which batch a preview section lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Creates,
    Updates,
    Deletes,
}

/// One row of a preview section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    pub title: String,
    pub path: String,
    pub remote_id: Option<String>,
    pub reasons: Vec<String>,
    pub previous_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSection {
    pub kind: SectionKind,
    pub heading: &'static str,
    pub rows: Vec<PreviewRow>,
}

/// Structured preview: creates, updates and deletes, in plan order.
pub fn preview_sections(plan: &SyncPlan) -> Vec<PreviewSection> {
    vec![
        PreviewSection {
            kind: SectionKind::Creates,
            heading: "Pages to create",
            rows: plan.creates().map(row).collect(),
        },
        PreviewSection {
            kind: SectionKind::Updates,
            heading: "Pages to update",
            rows: plan.updates().map(row).collect(),
        },
        PreviewSection {
            kind: SectionKind::Deletes,
            heading: "Pages to delete",
            rows: plan.deletes.iter().map(row).collect(),
        },
    ]
}

fn row(op: &Operation) -> PreviewRow {
    PreviewRow {
        title: op.title.clone(),
        path: op.display_path(),
        remote_id: op.remote_id.as_ref().map(|id| id.to_string()),
        reasons: op.change_reasons.iter().map(|r| r.to_string()).collect(),
        previous_title: op.previous_title.clone(),
    }
}

/// Plain-text rendering of [`preview_sections`].
pub fn render_preview(plan: &SyncPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sync under \"{}\" ({})", plan.root_title, plan.root_id);

    for section in preview_sections(plan) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({}):", section.heading, section.rows.len());
        if section.rows.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for row in &section.rows {
            let _ = write!(out, "  {}  [{}]", row.title, row.path);
            if let Some(id) = &row.remote_id {
                let _ = write!(out, "  id={id}");
            }
            if !row.reasons.is_empty() {
                let _ = write!(out, "  reasons: {}", row.reasons.join(", "));
            }
            let _ = writeln!(out);
            if let Some(previous) = &row.previous_title {
                let _ = writeln!(out, "      title: \"{previous}\" -> \"{}\"", row.title);
            }
        }
    }
    out
}
