//! Error types for wikisync-confluence

/// Result type for wikisync-confluence operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while setting up the Confluence client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
