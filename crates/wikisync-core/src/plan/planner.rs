//! Diff of the local tree against resolved remote pages

use std::collections::{BTreeSet, HashMap, HashSet};

use wikisync_content::normalize_storage;
use wikisync_fs::NormalizedPath;
use wikisync_fs::checksum::compute_content_checksum;

use super::order::{order_apply, order_deletes};
use super::{ChangeReason, Operation, OperationKind, ParentResolver, SyncPlan};
use crate::identity::{IdentityLabel, Resolutions, is_collision_variant};
use crate::remote::{RemotePageRef, RemoteTree};
use crate::scan::{FlatNode, LocalTree};

pub struct Planner<'a> {
    remote: &'a RemoteTree,
    resolutions: &'a Resolutions,
}

impl<'a> Planner<'a> {
    pub fn new(remote: &'a RemoteTree, resolutions: &'a Resolutions) -> Self {
        Self {
            remote,
            resolutions,
        }
    }

    /// Build the plan for `local`.
    pub fn plan(&self, local: &LocalTree) -> SyncPlan {
        let flat = local.flatten();
        let existing = self.resolutions.page_map();
        let parents = ParentResolver::new(self.remote, &existing);
        let no_created = HashMap::new();

        let pending: HashSet<&NormalizedPath> = flat
            .iter()
            .filter(|item| self.resolutions.get(&item.node.path).is_none())
            .map(|item| &item.node.path)
            .collect();

        let mut apply = Vec::new();
        let mut unchanged = Vec::new();

        for item in &flat {
            let resolved = self
                .resolutions
                .page_id(&item.node.path)
                .and_then(|id| self.remote.get(id));

            let Some(page) = resolved else {
                apply.push(create_operation(item));
                continue;
            };

            let mut reasons = BTreeSet::new();
            if item.node.title != page.title && !is_collision_variant(&page.title, &item.node.title) {
                reasons.insert(ChangeReason::Title);
            }
            let content_differs = match &page.body {
                Some(body) => normalize_storage(body) != item.node.normalized_content,
                None => true,
            };
            if content_differs {
                let remote = page
                    .body
                    .as_deref()
                    .map(|body| compute_content_checksum(&normalize_storage(body)));
                tracing::debug!(
                    path = %item.node.path,
                    local = %compute_content_checksum(&item.node.normalized_content),
                    remote = ?remote,
                    "Content differs"
                );
                reasons.insert(ChangeReason::Content);
            }
            // A parent that is still to be created never matches
            let parent_differs = if item.parent.is_some_and(|p| pending.contains(p)) {
                true
            } else {
                let expected = parents
                    .lookup(item.parent, &no_created)
                    .unwrap_or_else(|| self.remote.root().id.clone());
                page.parent_id.as_ref() != Some(&expected)
            };
            if parent_differs {
                reasons.insert(ChangeReason::Parent);
            }

            let op = update_operation(item, page, reasons);
            tracing::debug!(
                path = %item.node.path,
                page = %page.id,
                kind = %op.kind,
                reasons = ?op.change_reasons,
                "Planned resolved node"
            );
            if op.kind == OperationKind::NoOp {
                unchanged.push(op);
            } else {
                apply.push(op);
            }
        }

        let mut deletes: Vec<Operation> = self
            .remote
            .descendants()
            .into_iter()
            .filter(|page| !self.resolutions.is_claimed(&page.id))
            .map(|page| self.delete_operation(page))
            .collect();

        order_apply(&mut apply);
        order_deletes(&mut deletes);

        let plan = SyncPlan {
            root_id: self.remote.root().id.clone(),
            root_title: self.remote.root().title.clone(),
            apply,
            deletes,
            unchanged,
        };
        tracing::info!(
            creates = plan.creates().count(),
            updates = plan.updates().count(),
            deletes = plan.deletes.len(),
            unchanged = plan.unchanged.len(),
            "Planned sync"
        );
        plan
    }

    fn delete_operation(&self, page: &RemotePageRef) -> Operation {
        let local_path = page.labels.iter().find_map(|label| IdentityLabel::decode(label));
        Operation {
            kind: OperationKind::Delete,
            has_identity_label: local_path.is_some(),
            local_path,
            remote_id: Some(page.id.clone()),
            title: page.title.clone(),
            previous_title: None,
            content: String::new(),
            parent_path_key: None,
            change_reasons: BTreeSet::new(),
            depth: self.remote.depth(&page.id).unwrap_or(0),
            is_directory: false,
        }
    }
}

fn create_operation(item: &FlatNode<'_>) -> Operation {
    Operation {
        kind: OperationKind::Create,
        local_path: Some(item.node.path.clone()),
        remote_id: None,
        title: item.node.title.clone(),
        previous_title: None,
        content: item.node.content.clone(),
        parent_path_key: item.parent.cloned(),
        change_reasons: BTreeSet::new(),
        depth: item.depth,
        is_directory: item.node.is_directory(),
        has_identity_label: false,
    }
}

fn update_operation(item: &FlatNode<'_>, page: &RemotePageRef, reasons: BTreeSet<ChangeReason>) -> Operation {
    let renamed = reasons.contains(&ChangeReason::Title);
    let label = IdentityLabel::for_path(&item.node.path);
    Operation {
        kind: if reasons.is_empty() {
            OperationKind::NoOp
        } else {
            OperationKind::Update
        },
        local_path: Some(item.node.path.clone()),
        remote_id: Some(page.id.clone()),
        title: if renamed {
            item.node.title.clone()
        } else {
            page.title.clone()
        },
        previous_title: renamed.then(|| page.title.clone()),
        content: item.node.content.clone(),
        parent_path_key: item.parent.cloned(),
        change_reasons: reasons,
        depth: item.depth,
        is_directory: item.node.is_directory(),
        has_identity_label: page.labels.contains(label.as_str()),
    }
}
