//! Error types for wikisync-core

use std::path::PathBuf;

use crate::remote::{PageId, RemoteError};

/// Result type for wikisync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or applying a sync run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote store rejected the credentials
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The root page does not exist or cannot be read
    #[error("Root page {id} is not usable: {reason}")]
    InvalidRoot { id: PageId, reason: String },

    /// The source directory does not exist or is not a directory
    #[error("Source directory {path} is not usable: {reason}")]
    InvalidDirectory { path: PathBuf, reason: String },

    /// A remote call failed
    #[error("Remote {operation} failed for \"{title}\": {message}")]
    Transport {
        operation: &'static str,
        title: String,
        message: String,
    },

    /// A create collided with an existing title twice
    #[error("Page title \"{title}\" is still taken after retrying as \"{attempted}\"")]
    TitleCollision { title: String, attempted: String },

    /// The remote store does not implement an operation the run needs
    #[error("Remote store does not support {operation}")]
    NotSupported { operation: &'static str },

    /// The user declined a confirmation gate
    #[error("Aborted at the {stage} confirmation; no changes were made")]
    Aborted { stage: &'static str },

    /// Configuration could not be resolved
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Filesystem error from wikisync-fs
    #[error(transparent)]
    Fs(#[from] wikisync_fs::Error),

    /// Directory traversal error
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Classify a remote failure raised while applying `operation` to `title`.
    pub fn remote(operation: &'static str, title: &str, err: RemoteError) -> Self {
        match err {
            RemoteError::Authentication(message) => Self::Authentication { message },
            RemoteError::NotSupported { operation } => Self::NotSupported { operation },
            other => Self::Transport {
                operation,
                title: title.to_string(),
                message: other.to_string(),
            },
        }
    }
}
