//! Confluence REST page store for wikisync
//!
//! [`ConfluenceStore`] implements [`wikisync_core::RemotePageStore`] against
//! the `/rest/api/content` endpoints with a blocking HTTP client. Requests
//! are not retried.

pub mod error;
mod model;
pub mod store;

pub use error::{Error, Result};
pub use store::{ConfluenceConfig, ConfluenceStore};
