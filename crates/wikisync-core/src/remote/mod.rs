//! Remote page store interface
//!
//! The engine never talks to a wiki directly; it consumes a
//! [`RemotePageStore`] and works on a [`RemoteTree`] snapshot fetched once
//! per run.

mod memory;
mod tree;

pub use memory::MemoryStore;
pub use tree::RemoteTree;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Label length limit of the bundled stores
pub const DEFAULT_MAX_LABEL_LEN: usize = 255;

/// Opaque identifier of a remote page
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One existing remote page as seen in the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePageRef {
    pub id: PageId,
    pub title: String,
    /// `None` for a space-level page
    pub parent_id: Option<PageId>,
    pub version: u32,
    pub labels: BTreeSet<String>,
    /// Storage-format body, when the store returned it
    pub body: Option<String>,
    /// Space key, when known
    pub space: Option<String>,
}

/// Errors raised by a remote store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("page {0} not found")]
    NotFound(PageId),

    #[error("a page titled \"{title}\" already exists")]
    TitleCollision { title: String },

    #[error("{operation} is not supported")]
    NotSupported { operation: &'static str },

    #[error("{0}")]
    Transport(String),
}

/// Result type for remote store calls
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Optional features a store may lack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Labels can be read and written
    pub labels: bool,
    /// Pages can be moved under a new parent
    pub move_pages: bool,
    /// Longest label the store accepts
    pub max_label_len: usize,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            labels: true,
            move_pages: true,
            max_label_len: DEFAULT_MAX_LABEL_LEN,
        }
    }
}

/// A hierarchical page store the engine mirrors documents into.
///
/// All calls block. Implementations perform their own retries, if any.
pub trait RemotePageStore {
    /// Probe optional features before the run starts.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Fetch the root page followed by every page beneath it.
    fn get_subtree(&self, root: &PageId) -> RemoteResult<Vec<RemotePageRef>>;

    /// Create a page and return its id.
    fn create(&self, parent: &PageId, title: &str, content: &str) -> RemoteResult<PageId>;

    /// Replace title and content, returning the new version number.
    fn update(&self, id: &PageId, title: &str, content: &str) -> RemoteResult<u32>;

    /// Move a page under a new parent.
    fn update_parent(&self, id: &PageId, new_parent: &PageId) -> RemoteResult<bool>;

    fn delete(&self, id: &PageId) -> RemoteResult<bool>;

    fn get_labels(&self, id: &PageId) -> RemoteResult<BTreeSet<String>>;

    fn set_label(&self, id: &PageId, label: &str) -> RemoteResult<bool>;
}
