//! Configuration resolution
//!
//! Settings are merged from these sources (later sources override earlier):
//!
//! 1. **Global defaults** - `<config_dir>/wikisync/config.toml`
//! 2. **Project config** - `<source>/.wikisync/config.toml`
//! 3. **Local overrides** - `<source>/.wikisync/config.local.toml`
//! 4. **Command line** - flags passed by the binary
//!
//! The API token is never read from these files.
//!
//! ```toml
//! [remote]
//! base_url = "https://example.atlassian.net/wiki"
//! space = "DOC"
//! username = "docs-bot@example.com"
//!
//! [sync]
//! extensions = ["md", "markdown"]
//! ledger_dir = ".wikisync/runs"
//! ```

mod manifest;
mod resolver;

pub use manifest::{Manifest, RemoteSection, SyncSection};
pub use resolver::{ConfigResolver, PROJECT_DIR, ResolvedConfig};
