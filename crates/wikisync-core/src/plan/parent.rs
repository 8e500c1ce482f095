//! Parent page resolution shared by the planner and the executor

use std::collections::HashMap;

use wikisync_fs::NormalizedPath;

use super::Operation;
use crate::remote::{PageId, RemotePageRef, RemoteTree};
use crate::scan::directory_title;

/// Keys listed in the fallback warning
const EXISTING_KEY_SAMPLE: usize = 20;

/// Finds the page an operation's node should sit under.
pub struct ParentResolver<'a> {
    remote: &'a RemoteTree,
    existing: &'a HashMap<NormalizedPath, PageId>,
}

impl<'a> ParentResolver<'a> {
    /// `existing` maps resolved node paths to their pre-existing pages.
    pub fn new(remote: &'a RemoteTree, existing: &'a HashMap<NormalizedPath, PageId>) -> Self {
        Self { remote, existing }
    }

    /// Parent id without the root fallback.
    ///
    /// Looks in the pages created this run, then the resolved pages, then a
    /// title walk from the root, then anywhere in the snapshot for a chain of
    /// pages titled after the path segments. `None` as key means the root.
    pub fn lookup(
        &self,
        parent_key: Option<&NormalizedPath>,
        created: &HashMap<NormalizedPath, PageId>,
    ) -> Option<PageId> {
        let Some(key) = parent_key.filter(|k| !k.is_empty()) else {
            return Some(self.remote.root().id.clone());
        };

        if let Some(id) = created.get(key) {
            return Some(id.clone());
        }
        if let Some(id) = self.existing.get(key) {
            return Some(id.clone());
        }

        let titles: Vec<String> = key.segments().map(directory_title).collect();
        self.walk_from_root(&titles)
            .or_else(|| self.search_chain(&titles))
            .map(|page| page.id.clone())
    }

    /// Parent id for `op`, falling back to the root with a warning.
    pub fn resolve(&self, op: &Operation, created: &HashMap<NormalizedPath, PageId>) -> PageId {
        if let Some(id) = self.lookup(op.parent_path_key.as_ref(), created) {
            return id;
        }

        let mut existing_keys: Vec<&str> = self.existing.keys().map(|k| k.as_str()).collect();
        existing_keys.sort_unstable();
        existing_keys.truncate(EXISTING_KEY_SAMPLE);
        let mut created_keys: Vec<&str> = created.keys().map(|k| k.as_str()).collect();
        created_keys.sort_unstable();

        tracing::warn!(
            parent_path = op.parent_path_key.as_ref().map(|k| k.as_str()).unwrap_or(""),
            created_keys = ?created_keys,
            existing_keys = ?existing_keys,
            operation = %op.kind,
            path = %op.display_path(),
            title = %op.title,
            "Parent page not found, placing page under the root"
        );
        self.remote.root().id.clone()
    }

    fn walk_from_root(&self, titles: &[String]) -> Option<&'a RemotePageRef> {
        let mut current = self.remote.root();
        for title in titles {
            current = self
                .remote
                .children(&current.id)
                .find(|child| child.title.eq_ignore_ascii_case(title))?;
        }
        Some(current)
    }

    /// First page, breadth-first, whose own title and ancestors' titles
    /// spell out `titles` from the bottom up.
    fn search_chain(&self, titles: &[String]) -> Option<&'a RemotePageRef> {
        let (last, above) = titles.split_last()?;
        self.remote.descendants().into_iter().find(|page| {
            if !page.title.eq_ignore_ascii_case(last) {
                return false;
            }
            let mut current = *page;
            for title in above.iter().rev() {
                match self.remote.parent(&current.id) {
                    Some(parent) if parent.title.eq_ignore_ascii_case(title) => current = parent,
                    _ => return false,
                }
            }
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{OperationKind, Operation};
    use std::collections::BTreeSet;

    fn page(id: &str, title: &str, parent: Option<&str>) -> RemotePageRef {
        RemotePageRef {
            id: PageId::new(id),
            title: title.to_string(),
            parent_id: parent.map(PageId::new),
            version: 1,
            labels: BTreeSet::new(),
            body: None,
            space: None,
        }
    }

    fn tree() -> RemoteTree {
        RemoteTree::from_pages(
            &PageId::new("1"),
            vec![
                page("1", "Root", None),
                page("2", "guide", Some("1")),
                page("3", "advanced", Some("2")),
                page("4", "Archive", Some("1")),
                page("5", "reference", Some("4")),
                page("6", "api", Some("5")),
            ],
        )
        .unwrap()
    }

    fn op(parent: Option<&str>) -> Operation {
        Operation {
            kind: OperationKind::Create,
            local_path: Some(NormalizedPath::new("x.md")),
            remote_id: None,
            title: "X".to_string(),
            previous_title: None,
            content: String::new(),
            parent_path_key: parent.map(NormalizedPath::new),
            change_reasons: BTreeSet::new(),
            depth: 1,
            is_directory: false,
            has_identity_label: false,
        }
    }

    #[test]
    fn none_key_is_root() {
        let tree = tree();
        let existing = HashMap::new();
        let resolver = ParentResolver::new(&tree, &existing);
        assert_eq!(resolver.lookup(None, &HashMap::new()), Some(PageId::new("1")));
    }

    #[test]
    fn created_pages_win() {
        let tree = tree();
        let existing = HashMap::from([(NormalizedPath::new("guide"), PageId::new("2"))]);
        let created = HashMap::from([(NormalizedPath::new("guide"), PageId::new("99"))]);
        let resolver = ParentResolver::new(&tree, &existing);
        assert_eq!(
            resolver.lookup(Some(&NormalizedPath::new("guide")), &created),
            Some(PageId::new("99"))
        );
    }

    #[test]
    fn title_walk_follows_sanitized_segments() {
        let tree = tree();
        let existing = HashMap::new();
        let resolver = ParentResolver::new(&tree, &existing);
        assert_eq!(
            resolver.lookup(Some(&NormalizedPath::new("01-guide/advanced")), &HashMap::new()),
            Some(PageId::new("3"))
        );
    }

    #[test]
    fn chain_search_finds_nested_match() {
        let tree = tree();
        let existing = HashMap::new();
        let resolver = ParentResolver::new(&tree, &existing);
        assert_eq!(
            resolver.lookup(Some(&NormalizedPath::new("reference/api")), &HashMap::new()),
            Some(PageId::new("6"))
        );
    }

    #[test]
    fn unresolved_parent_falls_back_to_root() {
        let tree = tree();
        let existing = HashMap::new();
        let resolver = ParentResolver::new(&tree, &existing);
        assert_eq!(resolver.resolve(&op(Some("missing")), &HashMap::new()), PageId::new("1"));
    }
}
