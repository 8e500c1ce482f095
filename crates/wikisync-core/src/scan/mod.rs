//! Local tree scanner
//!
//! Walks the source directory and builds the canonical tree of documents the
//! rest of the run works from. Hidden entries are skipped, directories without
//! documents are pruned, and a directory holding a single document is folded
//! away so the document takes the directory's place.

mod title;

pub use title::{directory_title, filename_title};

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};
use wikisync_content::{ContentTranscoder, normalize_storage, strip_bom};
use wikisync_fs::NormalizedPath;

use crate::{Error, Result};

/// Extensions picked up when the configuration names none
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "markdown"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// One document or directory of the source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNode {
    /// Forward-slash path relative to the source directory
    pub path: NormalizedPath,
    pub kind: NodeKind,
    pub title: String,
    /// Storage-format body sent to the remote store
    pub content: String,
    /// Whitespace-insensitive form of `content` used for diffing
    pub normalized_content: String,
    /// Sorted case-insensitively by name
    pub children: Vec<LocalNode>,
}

impl LocalNode {
    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// A node in pre-order together with its position in the tree
#[derive(Debug, Clone, Copy)]
pub struct FlatNode<'a> {
    pub node: &'a LocalNode,
    /// Path of the parent node; `None` for nodes directly under the root
    pub parent: Option<&'a NormalizedPath>,
    /// 1 for top-level nodes
    pub depth: usize,
}

/// Scanned source directory
#[derive(Debug, Clone)]
pub struct LocalTree {
    pub source: PathBuf,
    /// Top-level nodes
    pub nodes: Vec<LocalNode>,
}

impl LocalTree {
    /// Every node in pre-order.
    pub fn flatten(&self) -> Vec<FlatNode<'_>> {
        let mut out = Vec::new();
        let mut stack: Vec<FlatNode<'_>> = self
            .nodes
            .iter()
            .rev()
            .map(|node| FlatNode {
                node,
                parent: None,
                depth: 1,
            })
            .collect();

        while let Some(flat) = stack.pop() {
            for child in flat.node.children.iter().rev() {
                stack.push(FlatNode {
                    node: child,
                    parent: Some(&flat.node.path),
                    depth: flat.depth + 1,
                });
            }
            out.push(flat);
        }
        out
    }

    /// Look a node up by its relative path.
    pub fn find(&self, path: &NormalizedPath) -> Option<&LocalNode> {
        self.flatten()
            .into_iter()
            .find(|flat| &flat.node.path == path)
            .map(|flat| flat.node)
    }

    pub fn len(&self) -> usize {
        self.flatten().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builds a [`LocalTree`] from a directory on disk
pub struct Scanner<'a> {
    transcoder: &'a dyn ContentTranscoder,
    extensions: Vec<String>,
}

struct PendingDir {
    path: NormalizedPath,
    depth: usize,
    children: Vec<LocalNode>,
}

impl<'a> Scanner<'a> {
    pub fn new(transcoder: &'a dyn ContentTranscoder) -> Self {
        Self {
            transcoder,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    /// Replace the document extensions (lowercase, no leading dot).
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Scan `source` into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDirectory`] when `source` is missing or not a
    /// directory, and [`Error::Walk`] or [`Error::Fs`] when an entry cannot be
    /// read.
    pub fn scan(&self, source: &Path) -> Result<LocalTree> {
        if !source.exists() {
            return Err(Error::InvalidDirectory {
                path: source.to_path_buf(),
                reason: "the path does not exist".to_string(),
            });
        }
        if !source.is_dir() {
            return Err(Error::InvalidDirectory {
                path: source.to_path_buf(),
                reason: "the path is not a directory".to_string(),
            });
        }

        let base = NormalizedPath::new(source);
        let mut top_level: Vec<LocalNode> = Vec::new();
        let mut pending: Vec<PendingDir> = Vec::new();

        let walker = WalkDir::new(source)
            .min_depth(1)
            .sort_by(|a, b| compare_names(a.file_name(), b.file_name()))
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in walker {
            let entry = entry?;
            let depth = entry.depth();

            while pending.last().is_some_and(|dir| dir.depth >= depth) {
                if let Some(dir) = pending.pop() {
                    attach(&mut pending, &mut top_level, finish_dir(dir));
                }
            }

            let relative = NormalizedPath::new(entry.path())
                .relative_to(&base)
                .unwrap_or_else(|| NormalizedPath::new(entry.file_name()));

            if entry.file_type().is_dir() {
                pending.push(PendingDir {
                    path: relative,
                    depth,
                    children: Vec::new(),
                });
            } else if self.is_document(entry.path()) {
                let node = self.read_document(entry.path(), relative)?;
                attach(&mut pending, &mut top_level, Some(node));
            }
        }

        while let Some(dir) = pending.pop() {
            attach(&mut pending, &mut top_level, finish_dir(dir));
        }

        let tree = LocalTree {
            source: source.to_path_buf(),
            nodes: top_level,
        };
        tracing::info!(source = %source.display(), nodes = tree.len(), "Scanned source directory");
        Ok(tree)
    }

    fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .map(|ext| self.extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    fn read_document(&self, native: &Path, path: NormalizedPath) -> Result<LocalNode> {
        let text = wikisync_fs::io::read_lossy(native)?;
        let source = strip_bom(&text);

        let title = self
            .transcoder
            .extract_title(source)
            .unwrap_or_else(|| filename_title(path.file_name().unwrap_or_default()));
        let content = self.transcoder.to_storage_format(source);
        let normalized_content = normalize_storage(&content);

        tracing::debug!(%path, %title, "Read document");
        Ok(LocalNode {
            path,
            kind: NodeKind::File,
            title,
            content,
            normalized_content,
            children: Vec::new(),
        })
    }
}

/// Close a directory: prune it when empty, fold it into its only document.
///
/// Directories close bottom-up, so a child directory that already folded
/// into its document counts as that file here. The collapse therefore
/// cascades: `a/b/c.md` alone leaves neither `a` nor `b` as a page.
fn finish_dir(dir: PendingDir) -> Option<LocalNode> {
    let PendingDir {
        path,
        mut children,
        ..
    } = dir;

    if children.is_empty() {
        tracing::debug!(%path, "Pruning directory without documents");
        return None;
    }
    if children.len() == 1 && children[0].kind == NodeKind::File {
        tracing::debug!(%path, file = %children[0].path, "Collapsing single-document directory");
        return children.pop();
    }

    let title = directory_title(path.file_name().unwrap_or_default());
    Some(LocalNode {
        path,
        kind: NodeKind::Directory,
        title,
        content: String::new(),
        normalized_content: String::new(),
        children,
    })
}

fn attach(pending: &mut [PendingDir], top_level: &mut Vec<LocalNode>, node: Option<LocalNode>) {
    let Some(node) = node else {
        return;
    };
    match pending.last_mut() {
        Some(parent) => parent.children.push(node),
        None => top_level.push(node),
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Case-insensitive name order with a case-sensitive tie-break.
fn compare_names(a: &OsStr, b: &OsStr) -> Ordering {
    let a = a.to_string_lossy();
    let b = b.to_string_lossy();
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_names_ignores_case_first() {
        assert_eq!(compare_names(OsStr::new("b"), OsStr::new("A")), Ordering::Greater);
        assert_eq!(compare_names(OsStr::new("a"), OsStr::new("B")), Ordering::Less);
        assert_eq!(compare_names(OsStr::new("A"), OsStr::new("a")), Ordering::Less);
    }

    #[test]
    fn finish_dir_prunes_and_collapses() {
        let empty = PendingDir {
            path: NormalizedPath::new("empty"),
            depth: 1,
            children: Vec::new(),
        };
        assert!(finish_dir(empty).is_none());

        let file = LocalNode {
            path: NormalizedPath::new("guide/setup.md"),
            kind: NodeKind::File,
            title: "setup".to_string(),
            content: String::new(),
            normalized_content: String::new(),
            children: Vec::new(),
        };
        let single = PendingDir {
            path: NormalizedPath::new("guide"),
            depth: 1,
            children: vec![file.clone()],
        };
        assert_eq!(finish_dir(single), Some(file));
    }
}
