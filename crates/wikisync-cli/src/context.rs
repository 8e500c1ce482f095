//! Per-invocation settings
//!
//! Resolves the layered configuration for a source directory and builds the
//! engine and its Confluence store from it.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use wikisync_confluence::{ConfluenceConfig, ConfluenceStore};
use wikisync_content::MarkdownTranscoder;
use wikisync_core::config::{Manifest, RemoteSection};
use wikisync_core::{ConfigResolver, ConfirmationGate, PageId, ResolvedConfig, SyncEngine, SyncOptions};
use wikisync_fs::NormalizedPath;

use crate::cli::TargetArgs;
use crate::error::{CliError, Result};

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "WIKISYNC_TOKEN";

/// Source directory, root page and resolved configuration
#[derive(Debug, Clone)]
pub struct RunContext {
    pub dir: PathBuf,
    pub root: PageId,
    pub config: ResolvedConfig,
}

impl RunContext {
    /// Resolve configuration for `dir`, with command-line flags applied last.
    pub fn load(dir: &Path, target: &TargetArgs) -> Result<Self> {
        ensure_directory(dir)?;
        let overrides = Manifest {
            remote: RemoteSection {
                base_url: target.base_url.clone(),
                space: target.space.clone(),
                username: target.username.clone(),
            },
            ..Manifest::default()
        };
        let config = resolver(dir).resolve_with(&overrides)?;
        tracing::debug!(?config, "Resolved configuration");

        Ok(Self {
            dir: dir.to_path_buf(),
            root: PageId::new(target.root.trim()),
            config,
        })
    }

    /// Confluence store for the configured site, authenticated from the environment.
    pub fn store(&self) -> Result<ConfluenceStore> {
        let base_url = self.config.base_url.clone().ok_or_else(|| {
            CliError::user(
                "No wiki URL configured. Set remote.base_url in .wikisync/config.toml or pass --base-url",
            )
        })?;
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| CliError::user(format!("{TOKEN_ENV} is not set")))?;

        let mut config = ConfluenceConfig::new(base_url, SecretString::from(token));
        config.username = self.config.username.clone();
        config.space = self.config.space.clone();
        Ok(ConfluenceStore::new(config)?)
    }

    pub fn engine(&self, gate: impl ConfirmationGate + 'static) -> Result<SyncEngine> {
        let engine = SyncEngine::new(
            Box::new(self.store()?),
            Box::new(MarkdownTranscoder::new()),
            Box::new(gate),
        );
        Ok(engine.with_options(SyncOptions {
            extensions: self.config.extensions.clone(),
            ledger_dir: Some(self.config.ledger_dir.clone()),
        }))
    }
}

/// Configuration resolver for a source directory.
pub fn resolver(dir: &Path) -> ConfigResolver {
    ConfigResolver::new(NormalizedPath::new(dir))
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "Source directory {} does not exist or is not a directory",
            dir.display()
        )))
    }
}
