//! Arena snapshot of the remote page tree

use std::collections::{HashMap, HashSet, VecDeque};

use super::{PageId, RemotePageRef};
use crate::{Error, Result};

/// In-memory snapshot of the pages under the sync root.
///
/// Pages live in a flat arena addressed by index; parent/child links are
/// index lists, and every traversal is iterative.
#[derive(Debug, Clone)]
pub struct RemoteTree {
    pages: Vec<RemotePageRef>,
    index: HashMap<PageId, usize>,
    children: Vec<Vec<usize>>,
    root: usize,
}

impl RemoteTree {
    /// Build a snapshot from the pages returned by the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRoot`] when `root` is not among `pages`.
    pub fn from_pages(root: &PageId, pages: Vec<RemotePageRef>) -> Result<Self> {
        let mut index = HashMap::with_capacity(pages.len());
        let mut unique = Vec::with_capacity(pages.len());
        for page in pages {
            if index.contains_key(&page.id) {
                continue;
            }
            index.insert(page.id.clone(), unique.len());
            unique.push(page);
        }

        let root_idx = *index.get(root).ok_or_else(|| Error::InvalidRoot {
            id: root.clone(),
            reason: "the page is not part of the fetched subtree".to_string(),
        })?;

        let mut children = vec![Vec::new(); unique.len()];
        for (idx, page) in unique.iter().enumerate() {
            if idx == root_idx {
                continue;
            }
            if let Some(parent_idx) = page.parent_id.as_ref().and_then(|p| index.get(p)) {
                children[*parent_idx].push(idx);
            }
        }

        Ok(Self {
            pages: unique,
            index,
            children,
            root: root_idx,
        })
    }

    pub fn root(&self) -> &RemotePageRef {
        &self.pages[self.root]
    }

    pub fn get(&self, id: &PageId) -> Option<&RemotePageRef> {
        self.index.get(id).map(|&idx| &self.pages[idx])
    }

    /// Direct children of `id`, in snapshot order.
    pub fn children<'a>(&'a self, id: &PageId) -> impl Iterator<Item = &'a RemotePageRef> + 'a {
        let list: &'a [usize] = self
            .index
            .get(id)
            .map(|&idx| self.children[idx].as_slice())
            .unwrap_or(&[]);
        list.iter().map(move |&idx| &self.pages[idx])
    }

    /// Every page reachable from the root, excluding the root, breadth-first.
    pub fn descendants(&self) -> Vec<&RemotePageRef> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<usize> = self.children[self.root].iter().copied().collect();
        let mut out = Vec::new();

        while let Some(idx) = queue.pop_front() {
            if idx == self.root || !seen.insert(idx) {
                continue;
            }
            out.push(&self.pages[idx]);
            queue.extend(self.children[idx].iter().copied());
        }
        out
    }

    /// Distance from the root (root = 0), or `None` when unreachable.
    pub fn depth(&self, id: &PageId) -> Option<usize> {
        let mut current = *self.index.get(id)?;
        let mut depth = 0;
        while current != self.root {
            let parent = self.pages[current]
                .parent_id
                .as_ref()
                .and_then(|p| self.index.get(p))?;
            current = *parent;
            depth += 1;
            if depth > self.pages.len() {
                return None;
            }
        }
        Some(depth)
    }

    /// Parent page of `id` within the snapshot.
    pub fn parent(&self, id: &PageId) -> Option<&RemotePageRef> {
        self.get(id)?.parent_id.as_ref().and_then(|p| self.get(p))
    }

    /// Number of pages in the snapshot, root included.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
