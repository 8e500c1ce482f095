//! Dependency ordering of planned operations

use std::cmp::Reverse;

use wikisync_fs::NormalizedPath;

use super::Operation;

/// Sort key of the create/update batch.
///
/// Shallow nodes come first, directories before files at the same depth,
/// then case-insensitive title and path as tie-breaks. Parents are always
/// shallower than their children, so they are materialized first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderKey {
    depth: usize,
    is_file: bool,
    title: String,
    path: NormalizedPath,
}

impl OrderKey {
    pub fn new(depth: usize, is_directory: bool, title: &str, path: &NormalizedPath) -> Self {
        Self {
            depth,
            is_file: !is_directory,
            title: title.to_lowercase(),
            path: path.clone(),
        }
    }

    fn for_operation(op: &Operation) -> Self {
        let path = op.local_path.clone().unwrap_or_else(NormalizedPath::root);
        Self::new(op.depth, op.is_directory, &op.title, &path)
    }
}

/// Stable sort of creates and updates into execution order.
pub fn order_apply(ops: &mut [Operation]) {
    ops.sort_by_cached_key(OrderKey::for_operation);
}

/// Deletes run deepest first so children go before their parents.
pub fn order_deletes(ops: &mut [Operation]) {
    ops.sort_by_cached_key(|op| (Reverse(op.depth), op.title.to_lowercase()));
}
