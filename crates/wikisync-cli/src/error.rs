//! Errors surfaced by the wikisync binary

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Scanning, planning or applying failed
    #[error(transparent)]
    Core(#[from] wikisync_core::Error),

    #[error(transparent)]
    Confluence(#[from] wikisync_confluence::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// `--json` output could not be encoded
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Missing settings or arguments, explained in plain words
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
