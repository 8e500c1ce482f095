//! In-process page store
//!
//! Behaves like a wiki space: titles are unique per space (case-insensitive),
//! deleting a page reparents its children, and every write bumps the version.
//! Clones share state, so a test can keep a handle while the engine owns
//! another.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::rc::Rc;

use super::{Capabilities, PageId, RemoteError, RemotePageRef, RemotePageStore, RemoteResult};

#[derive(Debug, Clone)]
struct StoredPage {
    title: String,
    parent: Option<PageId>,
    version: u32,
    body: String,
    labels: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    space: String,
    pages: BTreeMap<PageId, StoredPage>,
    next_id: u64,
    labels_unsupported: bool,
    moves_unsupported: bool,
    max_label_len: Option<usize>,
    failing_creates: HashSet<String>,
    failing_updates: HashSet<PageId>,
    failing_deletes: HashSet<PageId>,
    mutations: usize,
}

impl MemoryState {
    fn allocate_id(&mut self) -> PageId {
        self.next_id += 1;
        PageId::new(self.next_id.to_string())
    }

    fn title_taken(&self, title: &str, except: Option<&PageId>) -> bool {
        self.pages
            .iter()
            .any(|(id, page)| Some(id) != except && page.title.to_lowercase() == title.to_lowercase())
    }

    fn snapshot(&self, id: &PageId, page: &StoredPage) -> RemotePageRef {
        RemotePageRef {
            id: id.clone(),
            title: page.title.clone(),
            parent_id: page.parent.clone(),
            version: page.version,
            labels: page.labels.clone(),
            body: Some(page.body.clone()),
            space: Some(self.space.clone()),
        }
    }
}

/// Page store held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store for the given space key.
    pub fn new(space: impl Into<String>) -> Self {
        let store = Self::default();
        store.state.borrow_mut().space = space.into();
        store
    }

    /// Create a store holding a single top-level page, returning its id.
    pub fn with_root(space: impl Into<String>, title: &str) -> (Self, PageId) {
        let store = Self::new(space);
        let root = store.insert_page(None, title, "");
        (store, root)
    }

    /// Seed a page without counting it as a mutation.
    pub fn insert_page(&self, parent: Option<&PageId>, title: &str, body: &str) -> PageId {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.pages.insert(
            id.clone(),
            StoredPage {
                title: title.to_string(),
                parent: parent.cloned(),
                version: 1,
                body: body.to_string(),
                labels: BTreeSet::new(),
            },
        );
        id
    }

    /// Seed a label without counting it as a mutation.
    pub fn insert_label(&self, id: &PageId, label: &str) {
        if let Some(page) = self.state.borrow_mut().pages.get_mut(id) {
            page.labels.insert(label.to_string());
        }
    }

    /// Reject every label call with `NotSupported`.
    pub fn without_labels(self) -> Self {
        self.state.borrow_mut().labels_unsupported = true;
        self
    }

    /// Reject every move with `NotSupported`.
    pub fn without_moves(self) -> Self {
        self.state.borrow_mut().moves_unsupported = true;
        self
    }

    /// Advertise a smaller label length limit.
    pub fn with_max_label_len(self, len: usize) -> Self {
        self.state.borrow_mut().max_label_len = Some(len);
        self
    }

    /// Make creates of pages titled `title` fail with a transport error.
    pub fn fail_create(&self, title: &str) {
        self.state.borrow_mut().failing_creates.insert(title.to_string());
    }

    /// Make updates of `id` fail with a transport error.
    pub fn fail_update(&self, id: &PageId) {
        self.state.borrow_mut().failing_updates.insert(id.clone());
    }

    /// Make deletes of `id` fail with a transport error.
    pub fn fail_delete(&self, id: &PageId) {
        self.state.borrow_mut().failing_deletes.insert(id.clone());
    }

    pub fn page(&self, id: &PageId) -> Option<RemotePageRef> {
        let state = self.state.borrow();
        state.pages.get(id).map(|page| state.snapshot(id, page))
    }

    /// Find a page by exact title.
    pub fn find_by_title(&self, title: &str) -> Option<RemotePageRef> {
        let state = self.state.borrow();
        state
            .pages
            .iter()
            .find(|(_, page)| page.title == title)
            .map(|(id, page)| state.snapshot(id, page))
    }

    /// Titles of the direct children of `parent`, sorted.
    pub fn child_titles(&self, parent: &PageId) -> Vec<String> {
        let state = self.state.borrow();
        let mut titles: Vec<String> = state
            .pages
            .values()
            .filter(|page| page.parent.as_ref() == Some(parent))
            .map(|page| page.title.clone())
            .collect();
        titles.sort();
        titles
    }

    pub fn page_count(&self) -> usize {
        self.state.borrow().pages.len()
    }

    /// Number of successful writes since the store was built.
    pub fn mutation_count(&self) -> usize {
        self.state.borrow().mutations
    }

    fn require_labels(&self, operation: &'static str) -> RemoteResult<()> {
        if self.state.borrow().labels_unsupported {
            Err(RemoteError::NotSupported { operation })
        } else {
            Ok(())
        }
    }
}

impl RemotePageStore for MemoryStore {
    fn capabilities(&self) -> Capabilities {
        let state = self.state.borrow();
        let defaults = Capabilities::default();
        Capabilities {
            // Probing is optimistic; the run discovers missing labels on first use
            labels: true,
            move_pages: !state.moves_unsupported,
            max_label_len: state.max_label_len.unwrap_or(defaults.max_label_len),
        }
    }

    fn get_subtree(&self, root: &PageId) -> RemoteResult<Vec<RemotePageRef>> {
        let state = self.state.borrow();
        let root_page = state
            .pages
            .get(root)
            .ok_or_else(|| RemoteError::NotFound(root.clone()))?;

        let mut out = vec![state.snapshot(root, root_page)];
        let mut queue = VecDeque::from([root.clone()]);
        while let Some(parent) = queue.pop_front() {
            for (id, page) in &state.pages {
                if page.parent.as_ref() == Some(&parent) {
                    out.push(state.snapshot(id, page));
                    queue.push_back(id.clone());
                }
            }
        }
        Ok(out)
    }

    fn create(&self, parent: &PageId, title: &str, content: &str) -> RemoteResult<PageId> {
        let mut state = self.state.borrow_mut();
        if state.failing_creates.contains(title) {
            return Err(RemoteError::Transport(format!("injected failure creating {title}")));
        }
        if !state.pages.contains_key(parent) {
            return Err(RemoteError::NotFound(parent.clone()));
        }
        if state.title_taken(title, None) {
            return Err(RemoteError::TitleCollision {
                title: title.to_string(),
            });
        }

        let id = state.allocate_id();
        state.pages.insert(
            id.clone(),
            StoredPage {
                title: title.to_string(),
                parent: Some(parent.clone()),
                version: 1,
                body: content.to_string(),
                labels: BTreeSet::new(),
            },
        );
        state.mutations += 1;
        Ok(id)
    }

    fn update(&self, id: &PageId, title: &str, content: &str) -> RemoteResult<u32> {
        let mut state = self.state.borrow_mut();
        if state.failing_updates.contains(id) {
            return Err(RemoteError::Transport(format!("injected failure updating {id}")));
        }
        if state.title_taken(title, Some(id)) {
            return Err(RemoteError::TitleCollision {
                title: title.to_string(),
            });
        }
        let page = state
            .pages
            .get_mut(id)
            .ok_or_else(|| RemoteError::NotFound(id.clone()))?;
        page.title = title.to_string();
        page.body = content.to_string();
        page.version += 1;
        let version = page.version;
        state.mutations += 1;
        Ok(version)
    }

    fn update_parent(&self, id: &PageId, new_parent: &PageId) -> RemoteResult<bool> {
        let mut state = self.state.borrow_mut();
        if state.moves_unsupported {
            return Err(RemoteError::NotSupported {
                operation: "page move",
            });
        }
        if !state.pages.contains_key(new_parent) {
            return Err(RemoteError::NotFound(new_parent.clone()));
        }
        let page = state
            .pages
            .get_mut(id)
            .ok_or_else(|| RemoteError::NotFound(id.clone()))?;
        page.parent = Some(new_parent.clone());
        page.version += 1;
        state.mutations += 1;
        Ok(true)
    }

    fn delete(&self, id: &PageId) -> RemoteResult<bool> {
        let mut state = self.state.borrow_mut();
        if state.failing_deletes.contains(id) {
            return Err(RemoteError::Transport(format!("injected failure deleting {id}")));
        }
        let Some(removed) = state.pages.remove(id) else {
            return Ok(false);
        };
        for page in state.pages.values_mut() {
            if page.parent.as_ref() == Some(id) {
                page.parent = removed.parent.clone();
            }
        }
        state.mutations += 1;
        Ok(true)
    }

    fn get_labels(&self, id: &PageId) -> RemoteResult<BTreeSet<String>> {
        self.require_labels("labels")?;
        self.state
            .borrow()
            .pages
            .get(id)
            .map(|page| page.labels.clone())
            .ok_or_else(|| RemoteError::NotFound(id.clone()))
    }

    fn set_label(&self, id: &PageId, label: &str) -> RemoteResult<bool> {
        self.require_labels("labels")?;
        let mut state = self.state.borrow_mut();
        let page = state
            .pages
            .get_mut(id)
            .ok_or_else(|| RemoteError::NotFound(id.clone()))?;
        let added = page.labels.insert(label.to_string());
        Ok(added)
    }
}
