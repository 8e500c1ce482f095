//! Run ledger
//!
//! A run that created pages leaves a JSON manifest of them behind, one file
//! per run, so a human can find and clean up what the tool made.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wikisync_fs::{ConfigStore, NormalizedPath};

use crate::Result;
use crate::remote::PageId;

const FILE_PREFIX: &str = "wikisync-run-";
const FILE_SUFFIX: &str = ".json";

/// A page recorded in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerPage {
    pub page_id: PageId,
    pub title: String,
    pub space: Option<String>,
    pub version: u32,
}

/// Pages created by one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLedger {
    pub timestamp: DateTime<Utc>,
    pub root_page_id: PageId,
    pub root_page_title: String,
    pub source_directory: PathBuf,
    pub created_pages: Vec<LedgerPage>,
}

impl RunLedger {
    pub fn new(
        root_page_id: PageId,
        root_page_title: impl Into<String>,
        source_directory: impl Into<PathBuf>,
        created_pages: Vec<LedgerPage>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            root_page_id,
            root_page_title: root_page_title.into(),
            source_directory: source_directory.into(),
            created_pages,
        }
    }

    /// `wikisync-run-<UTC timestamp>.json`
    pub fn file_name(&self) -> String {
        format!(
            "{FILE_PREFIX}{}{FILE_SUFFIX}",
            self.timestamp.format("%Y%m%dT%H%M%S%3fZ")
        )
    }

    /// Write the ledger into `dir` atomically, returning the file path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        ConfigStore::new().save(&NormalizedPath::new(&path), self)?;
        tracing::info!(path = %path.display(), pages = self.created_pages.len(), "Wrote run ledger");
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let ledger: Self = ConfigStore::new().load(&NormalizedPath::new(path))?;
        Ok(ledger)
    }

    /// Every readable ledger in `dir`, newest first.
    ///
    /// A missing directory has no ledgers. Files that fail to parse are
    /// skipped with a warning.
    pub fn list(dir: &Path) -> Result<Vec<(PathBuf, RunLedger)>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut ledgers = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_ledger = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX));
            if !is_ledger {
                continue;
            }
            match Self::load(&path) {
                Ok(ledger) => ledgers.push((path, ledger)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Skipping unreadable run ledger");
                }
            }
        }

        ledgers.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
        Ok(ledgers)
    }
}
