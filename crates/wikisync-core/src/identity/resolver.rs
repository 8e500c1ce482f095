//! Tiered matching of local nodes to existing remote pages

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use wikisync_fs::NormalizedPath;

use super::label::IdentityLabel;
use crate::plan::order::OrderKey;
use crate::remote::{PageId, RemotePageRef, RemoteTree};
use crate::scan::{FlatNode, LocalTree};

/// Titles listed when a node matches nothing
const UNMATCHED_TITLE_SAMPLE: usize = 20;

/// How a node was matched to its page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchTier {
    /// The page carries the node's identity label
    Label,
    /// Case-insensitive title equality
    Title,
    /// The page title is a collision-suffixed form of the node's title
    CollisionSuffix,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Label => write!(f, "label"),
            Self::Title => write!(f, "title"),
            Self::CollisionSuffix => write!(f, "collision-suffix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub page: PageId,
    pub tier: MatchTier,
}

/// Matches found for one run, keyed by local path
#[derive(Debug, Clone, Default)]
pub struct Resolutions {
    by_path: HashMap<NormalizedPath, Resolution>,
    claimed: HashSet<PageId>,
}

impl Resolutions {
    pub fn get(&self, path: &NormalizedPath) -> Option<&Resolution> {
        self.by_path.get(path)
    }

    pub fn page_id(&self, path: &NormalizedPath) -> Option<&PageId> {
        self.by_path.get(path).map(|r| &r.page)
    }

    /// Whether some node claimed `page`.
    pub fn is_claimed(&self, page: &PageId) -> bool {
        self.claimed.contains(page)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Path to page id for every resolved node.
    pub fn page_map(&self) -> HashMap<NormalizedPath, PageId> {
        self.by_path
            .iter()
            .map(|(path, r)| (path.clone(), r.page.clone()))
            .collect()
    }

    fn claim(&mut self, path: &NormalizedPath, page: PageId, tier: MatchTier) {
        self.claimed.insert(page.clone());
        self.by_path.insert(path.clone(), Resolution { page, tier });
    }
}

/// Whether `existing` is the title a collision retry gives to `title`.
///
/// Matches `"{prefix} - {title}"` with a non-empty prefix, and
/// `"{title} (Duplicate)"`, ignoring case.
pub fn is_collision_variant(existing: &str, title: &str) -> bool {
    let existing = existing.to_lowercase();
    let title = title.to_lowercase();
    if title.is_empty() {
        return false;
    }
    if existing == format!("{title} (duplicate)") {
        return true;
    }
    existing
        .strip_suffix(&format!(" - {title}"))
        .is_some_and(|prefix| !prefix.trim().is_empty())
}

/// Maps local nodes to existing pages under the root.
pub struct IdentityResolver<'a> {
    remote: &'a RemoteTree,
    candidates: Vec<&'a RemotePageRef>,
    label_index: HashMap<NormalizedPath, PageId>,
}

impl<'a> IdentityResolver<'a> {
    /// Index the snapshot once.
    ///
    /// When two pages carry the same identity label the first one in
    /// breadth-first order wins.
    pub fn new(remote: &'a RemoteTree) -> Self {
        let candidates = remote.descendants();
        let mut label_index = HashMap::new();

        for page in &candidates {
            for label in &page.labels {
                let Some(path) = IdentityLabel::decode(label) else {
                    continue;
                };
                if let Some(first) = label_index.get(&path) {
                    tracing::warn!(
                        %path,
                        kept = %first,
                        ignored = %page.id,
                        "Identity label found on more than one page"
                    );
                    continue;
                }
                label_index.insert(path, page.id.clone());
            }
        }

        Self {
            remote,
            candidates,
            label_index,
        }
    }

    /// Page id carrying the identity label of `path`.
    pub fn by_label(&self, path: &NormalizedPath) -> Option<&PageId> {
        self.label_index.get(path)
    }

    /// Resolve every node of `local`.
    ///
    /// Label matches are claimed for all nodes first, then exact titles for
    /// all nodes, then collision-suffixed titles. Both title passes run
    /// parent-first over the pages nobody claimed.
    pub fn resolve(&self, local: &LocalTree) -> Resolutions {
        tracing::info!(
            existing_pages = self.candidates.len(),
            labelled = self.label_index.len(),
            "Resolving local nodes against existing pages"
        );

        let mut flat = local.flatten();
        let mut resolutions = Resolutions::default();

        for item in &flat {
            if let Some(page) = self.label_index.get(&item.node.path)
                && !resolutions.is_claimed(page)
            {
                resolutions.claim(&item.node.path, page.clone(), MatchTier::Label);
                tracing::debug!(path = %item.node.path, %page, tier = %MatchTier::Label, "Resolved node");
            }
        }

        flat.sort_by_cached_key(|item| {
            OrderKey::new(item.depth, item.node.is_directory(), &item.node.title, &item.node.path)
        });

        for item in &flat {
            if resolutions.get(&item.node.path).is_some() {
                continue;
            }
            let expected_parent = self.expected_parent(item, &resolutions);
            if let Some(page) = self.find_unclaimed(&resolutions, expected_parent.as_ref(), |page| {
                page.title.to_lowercase() == item.node.title.to_lowercase()
            }) {
                tracing::debug!(path = %item.node.path, page = %page.id, tier = %MatchTier::Title, "Resolved node");
                resolutions.claim(&item.node.path, page.id.clone(), MatchTier::Title);
            }
        }

        // Every page some node wants verbatim is claimed by now, so a suffixed
        // match cannot take a page from its exact owner.
        for item in &flat {
            if resolutions.get(&item.node.path).is_some() {
                continue;
            }
            let expected_parent = self.expected_parent(item, &resolutions);
            let found = self.find_unclaimed(&resolutions, expected_parent.as_ref(), |page| {
                is_collision_variant(&page.title, &item.node.title)
            });

            match found {
                Some(page) => {
                    tracing::debug!(path = %item.node.path, page = %page.id, tier = %MatchTier::CollisionSuffix, "Resolved node");
                    resolutions.claim(&item.node.path, page.id.clone(), MatchTier::CollisionSuffix);
                }
                None => {
                    let sample: Vec<&str> = self
                        .candidates
                        .iter()
                        .take(UNMATCHED_TITLE_SAMPLE)
                        .map(|page| page.title.as_str())
                        .collect();
                    tracing::debug!(
                        path = %item.node.path,
                        title = %item.node.title,
                        existing_titles = ?sample,
                        "No existing page matches node"
                    );
                }
            }
        }

        resolutions
    }

    /// Id the node's page should sit under, when already known.
    fn expected_parent(&self, item: &FlatNode<'_>, resolutions: &Resolutions) -> Option<PageId> {
        match item.parent {
            None => Some(self.remote.root().id.clone()),
            Some(parent) => resolutions.page_id(parent).cloned(),
        }
    }

    fn find_unclaimed(
        &self,
        resolutions: &Resolutions,
        expected_parent: Option<&PageId>,
        matches: impl Fn(&RemotePageRef) -> bool,
    ) -> Option<&'a RemotePageRef> {
        let mut fallback = None;
        for page in &self.candidates {
            if resolutions.is_claimed(&page.id) || !matches(page) {
                continue;
            }
            if expected_parent.is_some() && page.parent_id.as_ref() == expected_parent {
                return Some(*page);
            }
            fallback.get_or_insert(*page);
        }
        fallback
    }
}
