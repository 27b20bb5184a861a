//! HTTP client for the content store's entries API.
//!
//! The store serves entries from one endpoint per space and environment:
//!
//! ```text
//! GET {base}/spaces/{space_id}/environments/{environment}/entries?content_type=...
//! ```
//!
//! Responses are an envelope of `{ total, skip, limit, items, includes }`.
//! Linked records referenced by the items arrive separately under `includes`
//! as `Entry` and `Asset` collections; [`StoreClient::entries`] splices them
//! back into the items before handing the collection to the decoding layer.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::{Category, Publication};
use crate::query::EntryQuery;

/// Maximum number of link substitutions along one path. Includes can
/// reference each other, so resolution must be bounded to terminate on
/// cyclic link graphs.
const RESOLVE_DEPTH: u8 = 4;

/// Which view of the store to read. `Preview` includes unpublished drafts
/// and requires its own token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreView {
    Delivery,
    Preview,
}

/// A configured client for one space, environment, and view.
#[derive(Debug)]
pub struct StoreClient {
    http: reqwest::Client,
    entries_url: String,
    token: String,
}

impl StoreClient {
    /// Builds a client from the `[store]` configuration section.
    ///
    /// Fails with [`StoreError::NotConfigured`] when the space id or the
    /// token for the requested view is missing, so an unconfigured
    /// deployment is detectable before any request is made.
    pub fn new(config: &StoreConfig, view: StoreView) -> Result<Self, StoreError> {
        let space_id = config
            .space_id
            .as_deref()
            .ok_or(StoreError::NotConfigured("store.space_id"))?;
        let (base_url, token) = match view {
            StoreView::Delivery => (
                &config.delivery_url,
                config
                    .access_token
                    .as_deref()
                    .ok_or(StoreError::NotConfigured("store.access_token"))?,
            ),
            StoreView::Preview => (
                &config.preview_url,
                config
                    .preview_token
                    .as_deref()
                    .ok_or(StoreError::NotConfigured("store.preview_token"))?,
            ),
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            entries_url: format!(
                "{}/spaces/{}/environments/{}/entries",
                base_url.trim_end_matches('/'),
                space_id,
                config.environment
            ),
            token: token.to_string(),
        })
    }

    /// Fetches one page of entries and resolves linked records in place.
    pub async fn entries(&self, query: &EntryQuery) -> Result<EntryCollection, StoreError> {
        let response = self
            .http
            .get(&self.entries_url)
            .bearer_auth(&self.token)
            .query(&query.params())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let envelope: WireCollection = serde_json::from_str(&body)?;

        let index = LinkIndex::new(&envelope.includes);
        let mut items = envelope.items;
        for item in &mut items {
            resolve_value(item, &index, RESOLVE_DEPTH);
        }

        Ok(EntryCollection {
            total: envelope.total,
            skip: envelope.skip,
            limit: envelope.limit,
            items,
        })
    }
}

/// One page of raw entries with links already resolved.
#[derive(Debug, Clone)]
pub struct EntryCollection {
    pub total: u32,
    pub skip: u32,
    pub limit: u32,
    pub items: Vec<Value>,
}

impl EntryCollection {
    /// Decodes each item as a publication. Items that do not match the
    /// content model are dropped with a warning rather than failing the page.
    pub fn into_publications(self) -> Vec<Publication> {
        self.items
            .into_iter()
            .filter_map(|item| match Publication::from_entry(item) {
                Ok(publication) => Some(publication),
                Err(err) => {
                    warn!(error = %err, "skipping malformed publication entry");
                    None
                }
            })
            .collect()
    }

    /// Decodes each item as a category, dropping malformed entries.
    pub fn into_categories(self) -> Vec<Category> {
        self.items
            .into_iter()
            .filter_map(|item| match Category::from_entry(item) {
                Ok(category) => Some(category),
                Err(err) => {
                    warn!(error = %err, "skipping malformed category entry");
                    None
                }
            })
            .collect()
    }

    /// Extracts `fields.tags` from each item. Items without a tag list
    /// contribute an empty one.
    pub fn tag_lists(&self) -> Vec<Vec<String>> {
        self.items
            .iter()
            .map(|item| {
                item.pointer("/fields/tags")
                    .and_then(|tags| tags.as_array())
                    .map(|tags| {
                        tags.iter()
                            .filter_map(|tag| tag.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect()
    }
}

// ============ Wire envelope ============

#[derive(Debug, Deserialize)]
struct WireCollection {
    #[serde(default)]
    total: u32,
    #[serde(default)]
    skip: u32,
    #[serde(default)]
    limit: u32,
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    includes: WireIncludes,
}

#[derive(Debug, Default, Deserialize)]
struct WireIncludes {
    #[serde(rename = "Entry", default)]
    entries: Vec<Value>,
    #[serde(rename = "Asset", default)]
    assets: Vec<Value>,
}

// ============ Link resolution ============

struct LinkIndex {
    entries: HashMap<String, Value>,
    assets: HashMap<String, Value>,
}

impl LinkIndex {
    fn new(includes: &WireIncludes) -> Self {
        Self {
            entries: index_by_id(&includes.entries),
            assets: index_by_id(&includes.assets),
        }
    }

    fn lookup(&self, link_type: &str, id: &str) -> Option<&Value> {
        match link_type {
            "Entry" => self.entries.get(id),
            "Asset" => self.assets.get(id),
            _ => None,
        }
    }
}

fn index_by_id(records: &[Value]) -> HashMap<String, Value> {
    records
        .iter()
        .filter_map(|record| {
            let id = record.pointer("/sys/id")?.as_str()?;
            Some((id.to_string(), record.clone()))
        })
        .collect()
}

/// Replaces link stubs with their targets from the includes, recursively.
/// Stubs with no matching record are left in place; the lenient decoding
/// layer treats them as absent fields.
fn resolve_value(value: &mut Value, index: &LinkIndex, depth: u8) {
    if depth == 0 {
        return;
    }
    if let Some((link_type, id)) = value.as_object().and_then(as_link) {
        if let Some(target) = index.lookup(&link_type, &id) {
            *value = target.clone();
            resolve_value(value, index, depth - 1);
        }
        return;
    }
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                resolve_value(child, index, depth);
            }
        }
        Value::Array(items) => {
            for item in items {
                resolve_value(item, index, depth);
            }
        }
        _ => {}
    }
}

fn as_link(map: &serde_json::Map<String, Value>) -> Option<(String, String)> {
    let sys = map.get("sys")?.as_object()?;
    if sys.get("type")?.as_str()? != "Link" {
        return None;
    }
    let link_type = sys.get("linkType")?.as_str()?.to_string();
    let id = sys.get("id")?.as_str()?.to_string();
    Some((link_type, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(link_type: &str, id: &str) -> Value {
        json!({ "sys": { "type": "Link", "linkType": link_type, "id": id } })
    }

    fn includes(entries: Vec<Value>, assets: Vec<Value>) -> WireIncludes {
        WireIncludes { entries, assets }
    }

    #[test]
    fn test_resolves_entry_and_nested_asset_links() {
        let category = json!({
            "sys": { "id": "cat-1", "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z" },
            "fields": { "name": "Engineering", "slug": "engineering", "image": link("Asset", "asset-1") }
        });
        let asset = json!({
            "sys": { "id": "asset-1" },
            "fields": { "file": { "url": "//img.example.net/c.png", "contentType": "image/png" } }
        });
        let index = LinkIndex::new(&includes(vec![category], vec![asset]));

        let mut item = json!({
            "sys": { "id": "pub-1" },
            "fields": { "title": "T", "category": link("Entry", "cat-1") }
        });
        resolve_value(&mut item, &index, RESOLVE_DEPTH);

        assert_eq!(
            item.pointer("/fields/category/fields/slug").and_then(Value::as_str),
            Some("engineering")
        );
        // The asset link inside the substituted category resolved too.
        assert_eq!(
            item.pointer("/fields/category/fields/image/fields/file/contentType")
                .and_then(Value::as_str),
            Some("image/png")
        );
    }

    #[test]
    fn test_unmatched_link_stays_a_stub() {
        let index = LinkIndex::new(&includes(vec![], vec![]));
        let mut item = json!({ "fields": { "category": link("Entry", "missing") } });
        resolve_value(&mut item, &index, RESOLVE_DEPTH);
        assert_eq!(
            item.pointer("/fields/category/sys/type").and_then(Value::as_str),
            Some("Link")
        );
    }

    #[test]
    fn test_cyclic_links_terminate() {
        let a = json!({
            "sys": { "id": "a" },
            "fields": { "other": link("Entry", "b") }
        });
        let b = json!({
            "sys": { "id": "b" },
            "fields": { "other": link("Entry", "a") }
        });
        let index = LinkIndex {
            entries: [("a".to_string(), a), ("b".to_string(), b)]
                .into_iter()
                .collect(),
            assets: HashMap::new(),
        };

        let mut item = json!({ "fields": { "other": link("Entry", "a") } });
        resolve_value(&mut item, &index, RESOLVE_DEPTH);
        // Still a finite tree afterwards; the innermost reference is a stub.
        assert!(item.pointer("/fields/other/fields/other").is_some());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let collection = EntryCollection {
            total: 2,
            skip: 0,
            limit: 10,
            items: vec![
                json!({
                    "sys": { "id": "ok", "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z" },
                    "fields": { "title": "Good", "slug": "good" }
                }),
                json!({ "sys": { "id": "broken" }, "fields": { "slug": "no-title" } }),
            ],
        };
        let publications = collection.into_publications();
        assert_eq!(publications.len(), 1);
        assert_eq!(publications[0].slug, "good");
    }

    #[test]
    fn test_tag_lists_default_to_empty() {
        let collection = EntryCollection {
            total: 2,
            skip: 0,
            limit: 10,
            items: vec![
                json!({ "fields": { "tags": ["a", "b"] } }),
                json!({ "fields": {} }),
            ],
        };
        assert_eq!(
            collection.tag_lists(),
            vec![vec!["a".to_string(), "b".to_string()], vec![]]
        );
    }
}
