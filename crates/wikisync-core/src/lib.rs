//! Reconciliation engine mirroring a document tree onto wiki pages
//!
//! A run scans a source directory, fetches the page subtree under a root
//! page, matches documents to existing pages, plans the difference and
//! applies it after confirmation:
//!
//! ```text
//! scan -> resolve -> plan -> order -> confirm -> apply -> ledger
//! ```
//!
//! The engine only sees the remote wiki through [`RemotePageStore`] and the
//! document format through [`wikisync_content::ContentTranscoder`].
//!
//! # Example
//!
//! ```
//! use wikisync_content::MarkdownTranscoder;
//! use wikisync_core::{FixedAnswers, MemoryStore, SyncEngine};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("README.md"), "# Intro\n\nHello\n").unwrap();
//!
//! let (store, root) = MemoryStore::with_root("DOC", "Docs");
//! let mut engine = SyncEngine::new(
//!     Box::new(store.clone()),
//!     Box::new(MarkdownTranscoder::new()),
//!     Box::new(FixedAnswers::yes()),
//! );
//!
//! let result = engine.run(dir.path(), &root, false).unwrap();
//! assert_eq!(result.created, 1);
//! assert_eq!(store.child_titles(&root), vec!["Intro"]);
//! ```

pub mod config;
pub mod error;
pub mod execute;
pub mod gate;
pub mod identity;
pub mod ledger;
pub mod plan;
pub mod remote;
pub mod scan;
pub mod sync;

pub use config::{ConfigResolver, Manifest, ResolvedConfig};
pub use error::{Error, Result};
pub use execute::{ExecutionEngine, OperationState, RollbackJournal, RunState};
pub use gate::{ConfirmationGate, FixedAnswers, render_preview};
pub use identity::{IdentityLabel, IdentityResolver, MatchTier};
pub use ledger::{LedgerPage, RunLedger};
pub use plan::{ChangeReason, Operation, OperationKind, Planner, SyncPlan};
pub use remote::{Capabilities, MemoryStore, PageId, RemoteError, RemotePageRef, RemotePageStore, RemoteTree};
pub use scan::{LocalNode, LocalTree, NodeKind, Scanner};
pub use sync::{SyncEngine, SyncOptions, SyncResult};
