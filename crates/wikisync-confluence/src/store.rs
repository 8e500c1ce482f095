//! Blocking Confluence client implementing [`RemotePageStore`]

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use wikisync_core::remote::{Capabilities, DEFAULT_MAX_LABEL_LEN, RemoteResult};
use wikisync_core::{PageId, RemoteError, RemotePageRef, RemotePageStore};

use crate::model::{
    ContentList, ContentPage, LabelList, PAGE_EXPAND, create_body, label_body, update_body,
};
use crate::{Error, Result};

/// Child pages requested per listing call
const PAGE_LIMIT: usize = 50;

/// Longest error body quoted in messages
const BODY_SNIPPET: usize = 200;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings
pub struct ConfluenceConfig {
    /// Site URL, e.g. `https://example.atlassian.net/wiki`
    pub base_url: String,
    /// With a username the token is sent as basic auth, otherwise as a bearer token
    pub username: Option<String>,
    pub token: SecretString,
    /// Space key for new pages; learned from the root page when unset
    pub space: Option<String>,
    pub timeout: Duration,
}

impl ConfluenceConfig {
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            token,
            space: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for ConfluenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfluenceConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .field("space", &self.space)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Remote store backed by the Confluence content API
pub struct ConfluenceStore {
    client: Client,
    api: String,
    username: Option<String>,
    token: SecretString,
    space: RefCell<Option<String>>,
}

impl std::fmt::Debug for ConfluenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfluenceStore")
            .field("api", &self.api)
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .field("space", &self.space.borrow())
            .finish()
    }
}

impl ConfluenceStore {
    /// Build the client.
    ///
    /// # Errors
    ///
    /// Fails on a base URL that is not http(s) or when the HTTP client
    /// cannot be constructed.
    pub fn new(config: ConfluenceConfig) -> Result<Self> {
        let api = content_api(&config.base_url)?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api,
            username: config.username,
            token: config.token,
            space: RefCell::new(config.space),
        })
    }

    /// Space key used for creates, if known.
    pub fn space(&self) -> Option<String> {
        self.space.borrow().clone()
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.api)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("Accept", "application/json");
        match &self.username {
            Some(user) => request.basic_auth(user, Some(self.token.expose_secret())),
            None => request.bearer_auth(self.token.expose_secret()),
        }
    }

    fn send(&self, request: RequestBuilder, call: Call<'_>) -> RemoteResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .map_err(|err| RemoteError::Transport(format!("{} request failed: {err}", call.operation)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        tracing::debug!(operation = call.operation, %status, "Confluence returned an error");
        Err(classify(status, &body, call))
    }

    fn json<T: DeserializeOwned>(&self, request: RequestBuilder, call: Call<'_>) -> RemoteResult<T> {
        self.send(request, call)?.json().map_err(|err| {
            RemoteError::Transport(format!("{} returned an unreadable body: {err}", call.operation))
        })
    }

    fn fetch_page(&self, id: &PageId, expand: &str) -> RemoteResult<ContentPage> {
        let request = self
            .client
            .get(self.url(&format!("/{id}")))
            .query(&[("expand", expand)]);
        self.json(request, Call::on("fetch", id))
    }

    fn children(&self, parent: &PageId) -> RemoteResult<Vec<RemotePageRef>> {
        let mut pages = Vec::new();
        let mut start = 0;
        loop {
            let request = self
                .client
                .get(self.url(&format!("/{parent}/child/page")))
                .query(&[("expand", PAGE_EXPAND)])
                .query(&[("start", start), ("limit", PAGE_LIMIT)]);
            let batch: ContentList = self.json(request, Call::on("list children", parent))?;
            let count = batch.results.len();
            pages.extend(
                batch
                    .results
                    .into_iter()
                    .map(|page| page.into_ref(Some(parent.clone()))),
            );
            if count < PAGE_LIMIT {
                return Ok(pages);
            }
            start += count;
        }
    }

    fn put_page(&self, id: &PageId, body: &serde_json::Value, operation: &'static str) -> RemoteResult<ContentPage> {
        let request = self.client.put(self.url(&format!("/{id}"))).json(body);
        self.json(request, Call::on(operation, id))
    }
}

impl RemotePageStore for ConfluenceStore {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            labels: true,
            move_pages: true,
            max_label_len: DEFAULT_MAX_LABEL_LEN,
        }
    }

    fn get_subtree(&self, root: &PageId) -> RemoteResult<Vec<RemotePageRef>> {
        let root_page = self.fetch_page(root, PAGE_EXPAND)?.into_ref(None);
        let space_unknown = self.space.borrow().is_none();
        if space_unknown && let Some(space) = &root_page.space {
            tracing::debug!(%space, "Using the root page's space for new pages");
            *self.space.borrow_mut() = Some(space.clone());
        }

        let mut pages = vec![root_page];
        let mut queue = VecDeque::from([root.clone()]);
        while let Some(parent) = queue.pop_front() {
            for child in self.children(&parent)? {
                queue.push_back(child.id.clone());
                pages.push(child);
            }
        }
        tracing::debug!(root = %root, pages = pages.len(), "Fetched Confluence subtree");
        Ok(pages)
    }

    fn create(&self, parent: &PageId, title: &str, content: &str) -> RemoteResult<PageId> {
        let Some(space) = self.space() else {
            return Err(RemoteError::Transport(
                "space key unknown; set remote.space or fetch the root page first".to_string(),
            ));
        };
        let request = self
            .client
            .post(self.url(""))
            .json(&create_body(&space, parent, title, content));
        let created: ContentPage = self.json(
            request,
            Call {
                operation: "create",
                id: Some(parent),
                title: Some(title),
            },
        )?;
        Ok(PageId::new(created.id))
    }

    fn update(&self, id: &PageId, title: &str, content: &str) -> RemoteResult<u32> {
        let current = self.fetch_page(id, "version")?;
        let next = current.version_number() + 1;
        let updated = self.put_page(id, &update_body(id, title, content, next, None), "update")?;
        Ok(updated.version_number())
    }

    fn update_parent(&self, id: &PageId, new_parent: &PageId) -> RemoteResult<bool> {
        let current = self.fetch_page(id, "version,body.storage")?;
        let next = current.version_number() + 1;
        let body = update_body(
            id,
            &current.title,
            current.storage().unwrap_or_default(),
            next,
            Some(new_parent),
        );
        self.put_page(id, &body, "move")?;
        Ok(true)
    }

    fn delete(&self, id: &PageId) -> RemoteResult<bool> {
        let request = self.client.delete(self.url(&format!("/{id}")));
        match self.send(request, Call::on("delete", id)) {
            Ok(_) => Ok(true),
            Err(RemoteError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn get_labels(&self, id: &PageId) -> RemoteResult<BTreeSet<String>> {
        let request = self.client.get(self.url(&format!("/{id}/label")));
        let labels: LabelList = self.json(request, Call::on("labels", id))?;
        Ok(labels.results.into_iter().map(|l| l.name).collect())
    }

    fn set_label(&self, id: &PageId, label: &str) -> RemoteResult<bool> {
        let request = self
            .client
            .post(self.url(&format!("/{id}/label")))
            .json(&label_body(label));
        self.send(request, Call::on("labels", id))?;
        Ok(true)
    }
}

/// What a request was for, used to classify failures
#[derive(Debug, Clone, Copy)]
struct Call<'a> {
    operation: &'static str,
    id: Option<&'a PageId>,
    title: Option<&'a str>,
}

impl<'a> Call<'a> {
    fn on(operation: &'static str, id: &'a PageId) -> Self {
        Self {
            operation,
            id: Some(id),
            title: None,
        }
    }
}

/// `<base>/rest/api/content` for a site URL.
fn content_api(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return Err(Error::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: "expected an http:// or https:// URL".to_string(),
        });
    }
    Ok(format!("{trimmed}/rest/api/content"))
}

/// Map an unsuccessful response onto the store's error kinds.
fn classify(status: StatusCode, body: &str, call: Call<'_>) -> RemoteError {
    let snippet: String = body.trim().chars().take(BODY_SNIPPET).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RemoteError::Authentication(format!("{status} on {}", call.operation))
        }
        StatusCode::NOT_FOUND => match call.id {
            Some(id) if call.operation != "create" => RemoteError::NotFound(id.clone()),
            _ => RemoteError::Transport(format!("{} failed with {status}: {snippet}", call.operation)),
        },
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT
            if body.to_lowercase().contains("already exists") =>
        {
            RemoteError::TitleCollision {
                title: call.title.unwrap_or_default().to_string(),
            }
        }
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => RemoteError::NotSupported {
            operation: call.operation,
        },
        _ => RemoteError::Transport(format!("{} failed with {status}: {snippet}", call.operation)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn call(operation: &'static str) -> Call<'static> {
        Call {
            operation,
            id: None,
            title: Some("Overview"),
        }
    }

    #[rstest]
    #[case("https://example.atlassian.net/wiki", "https://example.atlassian.net/wiki/rest/api/content")]
    #[case("https://wiki.example.com/", "https://wiki.example.com/rest/api/content")]
    #[case("  http://localhost:8090// ", "http://localhost:8090/rest/api/content")]
    fn content_api_joins_base(#[case] base: &str, #[case] expected: &str) {
        assert_eq!(content_api(base).unwrap(), expected);
    }

    #[test]
    fn content_api_rejects_other_schemes() {
        assert!(matches!(
            content_api("wiki.example.com"),
            Err(Error::InvalidBaseUrl { .. })
        ));
    }

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED)]
    #[case(StatusCode::FORBIDDEN)]
    fn rejected_credentials(#[case] status: StatusCode) {
        assert!(matches!(
            classify(status, "", call("fetch")),
            RemoteError::Authentication(_)
        ));
    }

    #[test]
    fn missing_page_is_not_found() {
        let id = PageId::new("12");
        assert_eq!(
            classify(StatusCode::NOT_FOUND, "", Call::on("fetch", &id)),
            RemoteError::NotFound(id.clone())
        );
    }

    #[test]
    fn duplicate_title_is_collision() {
        let body = r#"{"message":"A page with this title already exists"}"#;
        assert_eq!(
            classify(StatusCode::BAD_REQUEST, body, call("create")),
            RemoteError::TitleCollision {
                title: "Overview".to_string()
            }
        );
    }

    #[test]
    fn other_bad_requests_are_transport_errors() {
        let err = classify(StatusCode::BAD_REQUEST, "invalid storage format", call("update"));
        assert_eq!(
            err,
            RemoteError::Transport("update failed with 400 Bad Request: invalid storage format".to_string())
        );
    }

    #[test]
    fn unimplemented_endpoints_are_not_supported() {
        assert_eq!(
            classify(StatusCode::NOT_IMPLEMENTED, "", call("labels")),
            RemoteError::NotSupported { operation: "labels" }
        );
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = ConfluenceConfig::new("https://wiki.example.com", SecretString::from("s3cret"));
        let store = ConfluenceStore::new(config).unwrap();
        let printed = format!("{store:?}");
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains("s3cret"));
    }
}
