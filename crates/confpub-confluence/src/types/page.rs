//! Confluence page types.

use serde::{Deserialize, Serialize};

/// Page record returned by content search, create and update.
///
/// Only includes fields that are actually used.
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageRecord {
    /// Page ID (server-assigned, immutable).
    pub id: String,
    /// Page title.
    #[serde(default)]
    pub title: String,
    /// Version information.
    pub version: Version,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl PageRecord {
    /// Relative web UI link, if the server sent one.
    #[must_use]
    pub fn webui(&self) -> Option<&str> {
        self.links.as_ref().and_then(|l| l.webui.as_deref())
    }
}

/// Page version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Version {
    /// Version number (starts at 1).
    pub number: u32,
}

/// Hypermedia links.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Links {
    /// Web UI link, relative to the server base URL.
    #[serde(default)]
    pub webui: Option<String>,
}

/// Content search response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResults {
    /// Matching pages.
    #[serde(default)]
    pub results: Vec<PageRecord>,
}

/// Body representation.
///
/// Only the storage format is ever written; `wiki` and `editor` bodies are
/// not interchangeable with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Confluence XHTML storage format.
    Storage,
}

/// Request for creating a page that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage<'a> {
    /// Page title.
    pub title: &'a str,
    /// Space key.
    pub space_key: &'a str,
    /// Parent page ID when nesting under a known page.
    pub parent_id: Option<&'a str>,
    /// Storage-format body.
    pub body: &'a str,
}

/// Request for updating an existing page.
///
/// Built from the looked-up [`PageRecord`] so the version sent is always
/// exactly one above the version the server reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUpdate<'a> {
    id: &'a str,
    version: u32,
    /// Page title.
    pub title: &'a str,
    /// Space key.
    pub space_key: &'a str,
    /// Storage-format body.
    pub body: &'a str,
}

impl<'a> PageUpdate<'a> {
    /// Prepare the next version of `current`.
    ///
    /// Returns `None` if the current version has no successor in `u32`.
    #[must_use]
    pub fn next(
        current: &'a PageRecord,
        title: &'a str,
        space_key: &'a str,
        body: &'a str,
    ) -> Option<Self> {
        Some(Self {
            id: &current.id,
            version: current.version.number.checked_add(1)?,
            title,
            space_key,
            body,
        })
    }

    /// ID of the page being updated.
    #[must_use]
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// Version number to send (current + 1).
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }
}

/// JSON body for `POST content` and `PUT content/{id}`.
#[derive(Debug, Serialize)]
pub(crate) struct PagePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(rename = "type")]
    content_type: &'static str,
    title: &'a str,
    space: SpaceRef<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ancestors: Vec<AncestorRef<'a>>,
    body: BodyPayload<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<VersionRef>,
}

#[derive(Debug, Serialize)]
struct SpaceRef<'a> {
    key: &'a str,
}

#[derive(Debug, Serialize)]
struct AncestorRef<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct BodyPayload<'a> {
    storage: StorageValue<'a>,
}

#[derive(Debug, Serialize)]
struct StorageValue<'a> {
    value: &'a str,
    representation: Representation,
}

#[derive(Debug, Serialize)]
struct VersionRef {
    number: u32,
}

impl<'a> PagePayload<'a> {
    fn base(title: &'a str, space_key: &'a str, body: &'a str) -> Self {
        Self {
            id: None,
            content_type: "page",
            title,
            space: SpaceRef { key: space_key },
            ancestors: Vec::new(),
            body: BodyPayload {
                storage: StorageValue {
                    value: body,
                    representation: Representation::Storage,
                },
            },
            version: None,
        }
    }

    /// Payload for creating a page: no id, no version.
    pub(crate) fn create(page: &NewPage<'a>) -> Self {
        let mut payload = Self::base(page.title, page.space_key, page.body);
        if let Some(parent_id) = page.parent_id {
            payload.ancestors.push(AncestorRef { id: parent_id });
        }
        payload
    }

    /// Payload for updating a page: id and next version number.
    pub(crate) fn update(update: &PageUpdate<'a>) -> Self {
        let mut payload = Self::base(update.title, update.space_key, update.body);
        payload.id = Some(update.id);
        payload.version = Some(VersionRef {
            number: update.version,
        });
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(version: u32) -> PageRecord {
        PageRecord {
            id: "P1".to_owned(),
            title: "Demo Page".to_owned(),
            version: Version { number: version },
            links: None,
        }
    }

    #[test]
    fn test_create_payload_has_no_version() {
        let page = NewPage {
            title: "Demo Page",
            space_key: "TUS",
            parent_id: None,
            body: "<p>hi</p>",
        };
        let value = serde_json::to_value(PagePayload::create(&page)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "page",
                "title": "Demo Page",
                "space": {"key": "TUS"},
                "body": {"storage": {"value": "<p>hi</p>", "representation": "storage"}}
            })
        );
    }

    #[test]
    fn test_create_payload_with_parent() {
        let page = NewPage {
            title: "19 Oct 2026",
            space_key: "TUS",
            parent_id: Some("98383"),
            body: "",
        };
        let value = serde_json::to_value(PagePayload::create(&page)).unwrap();
        assert_eq!(value["ancestors"], json!([{"id": "98383"}]));
        assert!(value.get("version").is_none());
    }

    #[test]
    fn test_update_payload_increments_version() {
        let current = record(3);
        let update = PageUpdate::next(&current, "Demo Page", "TUS", "<p>new</p>")
            .unwrap();
        assert_eq!(update.id(), "P1");
        assert_eq!(update.version(), 4);

        let value = serde_json::to_value(PagePayload::update(&update)).unwrap();
        assert_eq!(value["id"], json!("P1"));
        assert_eq!(value["version"], json!({"number": 4}));
        assert_eq!(value["body"]["storage"]["representation"], json!("storage"));
        assert!(value.get("ancestors").is_none());
    }

    #[test]
    fn test_next_version_exhausted() {
        let current = record(u32::MAX);
        assert_eq!(PageUpdate::next(&current, "Demo Page", "TUS", ""), None);
    }

    #[test]
    fn test_deserialize_search_results() {
        let json = r#"{
            "results": [
                {"id": "98379", "type": "page", "title": "Demo Page",
                 "version": {"number": 7, "when": "2025-01-01"},
                 "_links": {"webui": "/display/TUS/Demo+Page"}}
            ],
            "start": 0, "limit": 25, "size": 1
        }"#;
        let results: SearchResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.results.len(), 1);
        let page = &results.results[0];
        assert_eq!(page.id, "98379");
        assert_eq!(page.version.number, 7);
        assert_eq!(page.webui(), Some("/display/TUS/Demo+Page"));
    }

    #[test]
    fn test_deserialize_empty_search() {
        let json = r#"{"results": [], "size": 0}"#;
        let results: SearchResults = serde_json::from_str(json).unwrap();
        assert!(results.results.is_empty());
    }
}
