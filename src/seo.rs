//! Page metadata, canonical URLs, and structured data.
//!
//! Every page renders from a [`PageMeta`]: title, description, canonical
//! URL, social-sharing fields, and zero or more JSON-LD blocks. Descriptions
//! derive from the publication body via [`extract_description`] and are
//! capped at [`DESCRIPTION_LIMIT`] characters.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::models::{Category, Publication, RichDocument};
use crate::richtext;

/// Maximum description length in characters.
pub const DESCRIPTION_LIMIT: usize = 160;

/// Characters kept verbatim in URL path segments (RFC 3986 unreserved).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn publication_path(slug: &str) -> String {
    format!("/publications/{}", utf8_percent_encode(slug, SEGMENT))
}

pub fn category_path(slug: &str) -> String {
    format!("/categories/{}", utf8_percent_encode(slug, SEGMENT))
}

pub fn tag_path(tag: &str) -> String {
    format!("/tags/{}", utf8_percent_encode(tag, SEGMENT))
}

/// Everything the page head needs.
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub og_type: &'static str,
    pub og_image: String,
    pub site_name: String,
    pub locale: String,
    pub twitter: Option<String>,
    pub keywords: Vec<String>,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub author: Option<String>,
    /// Pre-serialized JSON-LD blocks, one `<script>` each.
    pub json_ld: Vec<String>,
}

/// Base metadata for a static page; entity pages extend this.
pub fn page_meta(site: &SiteConfig, title: &str, description: &str, path: &str) -> PageMeta {
    PageMeta {
        title: format!("{} | {}", title, site.name),
        description: description.to_string(),
        canonical: site.absolute_url(path),
        og_type: "website",
        og_image: site.og_image_url(),
        site_name: site.name.clone(),
        locale: site.locale.clone(),
        twitter: site.twitter.clone(),
        keywords: Vec::new(),
        published_time: None,
        modified_time: None,
        author: None,
        json_ld: Vec::new(),
    }
}

pub fn home_meta(site: &SiteConfig) -> PageMeta {
    let mut meta = page_meta(site, &site.name, &site.description, "/");
    meta.title = site.name.clone();
    meta.json_ld = vec![website_json_ld(site).to_string()];
    meta
}

pub fn publication_meta(site: &SiteConfig, publication: &Publication) -> PageMeta {
    let path = publication_path(&publication.slug);
    let description = extract_description(&publication.body, &site.description);
    let mut meta = page_meta(site, &publication.title, &description, &path);
    meta.og_type = "article";
    if let Some(image) = &publication.featured_image {
        meta.og_image = image.https_url();
    }
    meta.keywords = publication.tags.clone();
    meta.published_time = Some(publication.display_date().to_rfc3339());
    meta.modified_time = Some(publication.updated_at.to_rfc3339());
    meta.author = publication.author.clone();

    let mut trail = vec![("Home".to_string(), "/".to_string())];
    if let Some(category) = &publication.category {
        trail.push((category.name.clone(), category_path(&category.slug)));
    }
    trail.push((publication.title.clone(), path));
    meta.json_ld = vec![
        article_json_ld(site, publication).to_string(),
        breadcrumbs_json_ld(site, &trail).to_string(),
    ];
    meta
}

pub fn category_meta(site: &SiteConfig, category: &Category) -> PageMeta {
    let description = category
        .description
        .clone()
        .unwrap_or_else(|| format!("Publications about {}", category.name));
    let mut meta = page_meta(site, &category.name, &description, &category_path(&category.slug));
    if let Some(image) = &category.image {
        meta.og_image = image.https_url();
    }
    meta
}

pub fn tag_meta(site: &SiteConfig, tag: &str) -> PageMeta {
    page_meta(
        site,
        &format!("#{}", tag),
        &format!("Publications tagged \"{}\"", tag),
        &tag_path(tag),
    )
}

/// First-paragraph summary of a document, truncated to
/// [`DESCRIPTION_LIMIT`] characters. Documents with no usable paragraph
/// fall back to the given site description.
pub fn extract_description(doc: &RichDocument, fallback: &str) -> String {
    match richtext::first_paragraph_text(doc) {
        Some(text) => truncate_chars(&text, DESCRIPTION_LIMIT),
        None => fallback.to_string(),
    }
}

/// Character-counted truncation; the ellipsis counts toward the limit.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max - 3).collect();
    format!("{}...", kept)
}

// ============ Structured data ============

pub fn website_json_ld(site: &SiteConfig) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "WebSite",
        "name": site.name,
        "description": site.description,
        "url": site.base_url,
        "potentialAction": {
            "@type": "SearchAction",
            "target": format!("{}/search?q={{search_term_string}}", site.base_url),
            "query-input": "required name=search_term_string"
        }
    })
}

pub fn article_json_ld(site: &SiteConfig, publication: &Publication) -> Value {
    let image = publication
        .featured_image
        .as_ref()
        .map(|asset| asset.https_url())
        .unwrap_or_else(|| site.og_image_url());
    json!({
        "@context": "https://schema.org",
        "@type": "BlogPosting",
        "headline": publication.title,
        "description": extract_description(&publication.body, &site.description),
        "image": image,
        "datePublished": publication.display_date().to_rfc3339(),
        "dateModified": publication.updated_at.to_rfc3339(),
        "author": {
            "@type": "Person",
            "name": publication.author.as_deref().unwrap_or(&site.name)
        },
        "publisher": {
            "@type": "Organization",
            "name": site.name,
            "logo": { "@type": "ImageObject", "url": site.og_image_url() }
        },
        "mainEntityOfPage": {
            "@type": "WebPage",
            "@id": site.absolute_url(&publication_path(&publication.slug))
        },
        "keywords": publication.tags.join(", ")
    })
}

pub fn breadcrumbs_json_ld(site: &SiteConfig, trail: &[(String, String)]) -> Value {
    let elements: Vec<Value> = trail
        .iter()
        .enumerate()
        .map(|(position, (name, path))| {
            json!({
                "@type": "ListItem",
                "position": position + 1,
                "name": name,
                "item": site.absolute_url(path)
            })
        })
        .collect();
    json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": elements
    })
}
