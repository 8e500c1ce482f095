//! Filesystem helpers for wikisync
//!
//! Provides normalized path handling, atomic writes and config file loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
