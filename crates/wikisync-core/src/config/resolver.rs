//! Configuration resolution with hierarchical merge

use crate::Result;
use crate::scan::DEFAULT_EXTENSIONS;
use serde::Serialize;
use std::path::PathBuf;
use wikisync_fs::{ConfigStore, NormalizedPath};

use super::manifest::Manifest;

/// Directory inside the source tree holding project config and run ledgers
pub const PROJECT_DIR: &str = ".wikisync";

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub base_url: Option<String>,
    pub space: Option<String>,
    pub username: Option<String>,

    /// Document extensions, lowercase, without the leading dot
    pub extensions: Vec<String>,

    /// Absolute ledger directory
    pub ledger_dir: PathBuf,
}

/// Resolves configuration by merging multiple sources
///
/// Configuration is loaded from a hierarchy of sources:
/// 1. Global defaults (`<config_dir>/wikisync/config.toml`)
/// 2. Project config (`<source>/.wikisync/config.toml`)
/// 3. Local overrides (`<source>/.wikisync/config.local.toml`)
/// 4. Command-line overrides passed to [`ConfigResolver::resolve_with`]
///
/// Later sources override earlier ones.
pub struct ConfigResolver {
    /// Source directory being synced
    source: NormalizedPath,

    /// Override for the global config directory (used for testing).
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(source: NormalizedPath) -> Self {
        Self {
            source,
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    pub fn with_global_config_dir(source: NormalizedPath, global_config_dir: PathBuf) -> Self {
        Self {
            source,
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("wikisync"))
    }

    /// Resolve the configuration from files only.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.resolve_with(&Manifest::default())
    }

    /// Resolve the configuration, applying `overrides` last.
    ///
    /// Missing layers are skipped. A layer that fails to parse is an error.
    pub fn resolve_with(&self, overrides: &Manifest) -> Result<ResolvedConfig> {
        let store = ConfigStore::new();
        let mut manifest = Manifest::default();

        let mut layers = Vec::with_capacity(3);
        if let Some(global_dir) = self.global_config_dir() {
            layers.push(("global", NormalizedPath::new(global_dir.join("config.toml"))));
        }
        layers.push(("project", self.project_config_path()));
        layers.push(("local", self.local_config_path()));

        for (layer, path) in layers {
            if path.is_file() {
                tracing::debug!(%path, layer, "Loading config layer");
                let loaded: Manifest = store.load(&path)?;
                manifest.merge(&loaded);
            } else {
                tracing::debug!(%path, layer, "No config found, skipping");
            }
        }

        manifest.merge(overrides);
        Ok(self.finish(manifest))
    }

    fn finish(&self, manifest: Manifest) -> ResolvedConfig {
        let extensions = manifest
            .sync
            .extensions
            .map(|list| {
                list.iter()
                    .map(|ext| ext.trim_start_matches('.').to_lowercase())
                    .filter(|ext| !ext.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect());

        let ledger_dir = match manifest.sync.ledger_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => self.source.to_native().join(dir),
            None => self.source.join(PROJECT_DIR).join("runs").to_native(),
        };

        ResolvedConfig {
            base_url: manifest.remote.base_url,
            space: manifest.remote.space,
            username: manifest.remote.username,
            extensions,
            ledger_dir,
        }
    }

    pub fn source(&self) -> &NormalizedPath {
        &self.source
    }

    pub fn project_config_path(&self) -> NormalizedPath {
        self.source.join(PROJECT_DIR).join("config.toml")
    }

    pub fn local_config_path(&self) -> NormalizedPath {
        self.source.join(PROJECT_DIR).join("config.local.toml")
    }

    pub fn has_config(&self) -> bool {
        self.project_config_path().is_file()
    }
}
