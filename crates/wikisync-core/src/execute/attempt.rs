//! Bounded create retry on title collisions

use crate::remote::{PageId, RemoteError, RemotePageStore};
use crate::{Error, Result};

/// Where a create stands in the collision retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateAttempt {
    /// Original title
    First,
    /// Collision-suffixed title; another collision is final
    Suffixed,
}

/// Title used for the single retry after a collision.
pub fn collision_title(title: &str, root_title: Option<&str>) -> String {
    match root_title.map(str::trim).filter(|root| !root.is_empty()) {
        Some(root) => format!("{root} - {title}"),
        None => format!("{title} (Duplicate)"),
    }
}

/// A page the store accepted, with the title it was finally given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPage {
    pub id: PageId,
    pub title: String,
}

/// Create a page, retrying once under a suffixed title on collision.
///
/// # Errors
///
/// Returns [`Error::TitleCollision`] when the suffixed title collides too,
/// and the mapped remote error for any other failure.
pub fn create_with_retry(
    store: &dyn RemotePageStore,
    parent: &PageId,
    title: &str,
    content: &str,
    root_title: Option<&str>,
) -> Result<CreatedPage> {
    let mut attempt = CreateAttempt::First;
    let mut current = title.to_string();

    loop {
        match store.create(parent, &current, content) {
            Ok(id) => return Ok(CreatedPage { id, title: current }),
            Err(RemoteError::TitleCollision { .. }) => match attempt {
                CreateAttempt::First => {
                    let retry = collision_title(title, root_title);
                    tracing::warn!(%title, %retry, "Title already taken, retrying with suffix");
                    attempt = CreateAttempt::Suffixed;
                    current = retry;
                }
                CreateAttempt::Suffixed => {
                    return Err(Error::TitleCollision {
                        title: title.to_string(),
                        attempted: current,
                    });
                }
            },
            Err(err) => return Err(Error::remote("create", &current, err)),
        }
    }
}
