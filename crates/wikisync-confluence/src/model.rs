//! Wire types of the content API

use serde::Deserialize;
use serde_json::{Value, json};
use wikisync_core::{PageId, RemotePageRef};

/// `expand` for every page read
pub(crate) const PAGE_EXPAND: &str = "version,ancestors,body.storage,metadata.labels,space";

#[derive(Debug, Deserialize)]
pub(crate) struct ContentPage {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub version: Option<Version>,
    #[serde(default)]
    pub ancestors: Vec<Ancestor>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub space: Option<SpaceRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Version {
    pub number: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Ancestor {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Body {
    #[serde(default)]
    pub storage: Option<Storage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Storage {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Metadata {
    #[serde(default)]
    pub labels: Option<LabelList>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LabelList {
    #[serde(default)]
    pub results: Vec<Label>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Label {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpaceRef {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentList {
    #[serde(default)]
    pub results: Vec<ContentPage>,
}

impl ContentPage {
    pub fn version_number(&self) -> u32 {
        self.version.as_ref().map_or(1, |v| v.number)
    }

    pub fn storage(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map(|s| s.value.as_str())
    }

    /// Convert to the engine's view. `parent` overrides the ancestor chain,
    /// which child listings leave out.
    pub fn into_ref(self, parent: Option<PageId>) -> RemotePageRef {
        let parent_id = parent.or_else(|| self.ancestors.last().map(|a| PageId::new(&a.id)));
        let labels = self
            .metadata
            .as_ref()
            .and_then(|m| m.labels.as_ref())
            .map(|list| list.results.iter().map(|l| l.name.clone()).collect())
            .unwrap_or_default();
        RemotePageRef {
            id: PageId::new(&self.id),
            version: self.version_number(),
            body: self.storage().map(str::to_string),
            space: self.space.as_ref().map(|s| s.key.clone()),
            title: self.title,
            parent_id,
            labels,
        }
    }
}

pub(crate) fn create_body(space: &str, parent: &PageId, title: &str, content: &str) -> Value {
    json!({
        "type": "page",
        "title": title,
        "space": { "key": space },
        "ancestors": [{ "id": parent.as_str() }],
        "body": { "storage": { "value": content, "representation": "storage" } },
    })
}

pub(crate) fn update_body(
    id: &PageId,
    title: &str,
    content: &str,
    version: u32,
    parent: Option<&PageId>,
) -> Value {
    let mut body = json!({
        "id": id.as_str(),
        "type": "page",
        "title": title,
        "version": { "number": version },
        "body": { "storage": { "value": content, "representation": "storage" } },
    });
    if let Some(parent) = parent {
        body["ancestors"] = json!([{ "id": parent.as_str() }]);
    }
    body
}

pub(crate) fn label_body(label: &str) -> Value {
    json!([{ "prefix": "global", "name": label }])
}
