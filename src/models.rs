//! Core data types.
//!
//! Two layers live here: the flat entity types the rest of the crate works
//! with ([`Publication`], [`Category`], [`ImageAsset`]), and the wire-format
//! structs that mirror the store's entry envelope. Entries arrive as
//! `{ sys, fields }` pairs with linked records either resolved in place or
//! left as link stubs; every linked field decodes leniently, so a stub the
//! resolver could not satisfy becomes `None` instead of failing the entry.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

// ============ Wire envelope ============

/// A `{ sys, fields }` entry as returned by the store.
#[derive(Debug, Clone, Deserialize)]
struct Entry<F> {
    sys: EntrySys,
    fields: F,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntrySys {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicationFields {
    title: String,
    slug: String,
    #[serde(default, deserialize_with = "lenient")]
    body: Option<RichDocument>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    category: Option<Category>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    featured_image: Option<ImageAsset>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryFields {
    name: String,
    slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    image: Option<ImageAsset>,
}

#[derive(Debug, Clone, Deserialize)]
struct AssetEntry {
    fields: AssetFields,
}

#[derive(Debug, Clone, Deserialize)]
struct AssetFields {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    file: AssetFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetFile {
    url: String,
    content_type: String,
    #[serde(default)]
    details: AssetDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AssetDetails {
    #[serde(default)]
    image: Option<ImageDimensions>,
}

/// Decodes a value that may still be an unresolved link stub (or otherwise
/// malformed) as `None` rather than failing the surrounding entry.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ============ Entities ============

/// A published article.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "Entry<PublicationFields>")]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub body: RichDocument,
    pub author: Option<String>,
    pub category: Option<Category>,
    pub tags: Vec<String>,
    pub featured_image: Option<ImageAsset>,
    /// Editorial publication date; display falls back to `created_at`.
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Entry<PublicationFields>> for Publication {
    fn from(entry: Entry<PublicationFields>) -> Self {
        let fields = entry.fields;
        Self {
            id: entry.sys.id,
            title: fields.title,
            slug: fields.slug,
            body: fields.body.unwrap_or_default(),
            author: fields.author,
            category: fields.category,
            tags: fields.tags,
            featured_image: fields.featured_image,
            published_at: fields.published_at,
            created_at: entry.sys.created_at,
            updated_at: entry.sys.updated_at,
        }
    }
}

impl Publication {
    pub fn from_entry(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Date shown to readers.
    pub fn display_date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }
}

/// An editorial section grouping publications.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "Entry<CategoryFields>")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<ImageAsset>,
}

impl From<Entry<CategoryFields>> for Category {
    fn from(entry: Entry<CategoryFields>) -> Self {
        let fields = entry.fields;
        Self {
            id: entry.sys.id,
            name: fields.name,
            slug: fields.slug,
            description: fields.description,
            image: fields.image,
        }
    }
}

impl Category {
    pub fn from_entry(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

/// A media asset attached to an entry. The store serves asset URLs
/// protocol-relative (`//host/path`); use [`ImageAsset::https_url`].
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "AssetEntry")]
pub struct ImageAsset {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content_type: String,
    pub dimensions: Option<ImageDimensions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl From<AssetEntry> for ImageAsset {
    fn from(asset: AssetEntry) -> Self {
        Self {
            url: asset.fields.file.url,
            title: asset.fields.title,
            description: asset.fields.description,
            content_type: asset.fields.file.content_type,
            dimensions: asset.fields.file.details.image,
        }
    }
}

impl ImageAsset {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image")
    }

    pub fn https_url(&self) -> String {
        if self.url.starts_with("//") {
            format!("https:{}", self.url)
        } else {
            self.url.clone()
        }
    }

    pub fn alt_text(&self) -> &str {
        self.description
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("")
    }
}

/// One page of publications plus the store's match count for the whole query.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub items: Vec<Publication>,
    /// Total matches in the store, not just this page.
    pub total: u32,
    pub skip: u32,
    pub limit: u32,
}

impl ResultSet {
    pub fn empty() -> Self {
        Self::default()
    }
}

// ============ Rich document ============

/// A structured document tree as stored in a publication body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichDocument {
    #[serde(default)]
    pub content: Vec<Node>,
}

/// One node of a rich document.
///
/// The store's node vocabulary is open-ended; anything outside the set below
/// decodes as [`Node::Unknown`] and renders as nothing, leaving siblings
/// untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "nodeType")]
pub enum Node {
    #[serde(rename = "paragraph")]
    Paragraph(Block),
    #[serde(rename = "heading-1")]
    Heading1(Block),
    #[serde(rename = "heading-2")]
    Heading2(Block),
    #[serde(rename = "heading-3")]
    Heading3(Block),
    #[serde(rename = "heading-4")]
    Heading4(Block),
    #[serde(rename = "heading-5")]
    Heading5(Block),
    #[serde(rename = "heading-6")]
    Heading6(Block),
    #[serde(rename = "unordered-list")]
    UnorderedList(Block),
    #[serde(rename = "ordered-list")]
    OrderedList(Block),
    #[serde(rename = "list-item")]
    ListItem(Block),
    #[serde(rename = "blockquote")]
    Blockquote(Block),
    #[serde(rename = "hr")]
    Hr,
    #[serde(rename = "text")]
    Text(TextNode),
    #[serde(rename = "hyperlink")]
    Hyperlink(LinkNode),
    #[serde(rename = "embedded-asset-block")]
    EmbeddedAsset(AssetNode),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextNode {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Code,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkNode {
    #[serde(default)]
    pub data: LinkData,
    #[serde(default)]
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkData {
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetNode {
    #[serde(default)]
    pub data: AssetNodeData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetNodeData {
    /// Resolved asset, or `None` when the link stub survived resolution.
    #[serde(default, deserialize_with = "lenient")]
    pub target: Option<ImageAsset>,
}
