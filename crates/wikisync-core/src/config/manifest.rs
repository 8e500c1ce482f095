//! Manifest parsing for config.toml files
//!
//! A manifest is the parsed content of a single config file. Every field is
//! optional so that layers can be merged, with later layers overriding
//! earlier ones field by field.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Connection settings for the remote store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSection {
    /// Base URL of the wiki, e.g. `https://example.atlassian.net/wiki`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Space key the pages live in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,

    /// Account name paired with the API token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Scanner and ledger settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSection {
    /// Document extensions to pick up, without the leading dot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,

    /// Where run ledgers are written; relative paths are taken from the
    /// source directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_dir: Option<PathBuf>,
}

/// One configuration layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub remote: RemoteSection,

    #[serde(default)]
    pub sync: SyncSection,
}

impl Manifest {
    /// Parse a manifest from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use wikisync_core::config::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"
    /// [remote]
    /// space = "DOC"
    /// "#).unwrap();
    ///
    /// assert_eq!(manifest.remote.space.as_deref(), Some("DOC"));
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        Ok(manifest)
    }

    /// Overlay `other` on top of this manifest.
    ///
    /// Fields set in `other` win; unset fields keep the current value.
    pub fn merge(&mut self, other: &Manifest) {
        overlay(&mut self.remote.base_url, &other.remote.base_url);
        overlay(&mut self.remote.space, &other.remote.space);
        overlay(&mut self.remote.username, &other.remote.username);
        overlay(&mut self.sync.extensions, &other.sync.extensions);
        overlay(&mut self.sync.ledger_dir, &other.sync.ledger_dir);
    }
}

fn overlay<T: Clone>(base: &mut Option<T>, other: &Option<T>) {
    if let Some(value) = other {
        *base = Some(value.clone());
    }
}
