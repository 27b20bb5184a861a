//! Translation of reader-facing filters into store query parameters.
//!
//! The content store exposes one generic `/entries` endpoint; everything the
//! site can ask for is expressed through request parameters. This module owns
//! that vocabulary so the rest of the crate never builds parameter strings by
//! hand.

/// Content type identifier for publication entries.
pub const PUBLICATION_TYPE: &str = "publication";
/// Content type identifier for category entries.
pub const CATEGORY_TYPE: &str = "category";

/// Default page size for publication listings.
pub const DEFAULT_LIMIT: u32 = 10;
/// Link resolution depth requested from the store.
pub const INCLUDE_DEPTH: u8 = 2;

/// Reader-facing filters for a publication listing.
///
/// All present filters AND-combine. `text` is matched by the store across
/// the indexed fields of the entry (title, body, tags, author, category).
#[derive(Debug, Clone)]
pub struct PublicationQuery {
    /// Page size; `None` leaves the store's own default in force.
    pub limit: Option<u32>,
    pub skip: u32,
    pub category_slug: Option<String>,
    pub tag: Option<String>,
    pub text: Option<String>,
}

impl Default for PublicationQuery {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_LIMIT),
            skip: 0,
            category_slug: None,
            tag: None,
            text: None,
        }
    }
}

/// One store-side constraint on an entries query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Publications whose linked category carries this slug.
    CategorySlug(String),
    /// Publications carrying this tag.
    HasTag(String),
    /// Store-level full-text search across the indexed fields.
    FullText(String),
    /// Exact match on one field path.
    FieldEquals(&'static str, String),
}

impl Filter {
    fn push_params(&self, params: &mut Vec<(String, String)>) {
        match self {
            Filter::CategorySlug(slug) => {
                // Link filters need the linked content type pinned alongside
                // the field constraint.
                params.push((
                    "fields.category.sys.contentType.sys.id".to_string(),
                    CATEGORY_TYPE.to_string(),
                ));
                params.push(("fields.category.fields.slug".to_string(), slug.clone()));
            }
            Filter::HasTag(tag) => {
                params.push(("fields.tags[in]".to_string(), tag.clone()));
            }
            Filter::FullText(text) => {
                params.push(("query".to_string(), text.clone()));
            }
            Filter::FieldEquals(field, value) => {
                params.push(((*field).to_string(), value.clone()));
            }
        }
    }
}

/// A fully translated store query, ready to serialize as request parameters.
#[derive(Debug, Clone)]
pub struct EntryQuery {
    content_type: &'static str,
    order: Option<&'static str>,
    limit: Option<u32>,
    skip: Option<u32>,
    include: Option<u8>,
    select: Option<&'static str>,
    filters: Vec<Filter>,
}

impl EntryQuery {
    fn new(content_type: &'static str) -> Self {
        Self {
            content_type,
            order: None,
            limit: None,
            skip: None,
            include: None,
            select: None,
            filters: Vec::new(),
        }
    }

    /// Request parameters in a stable order: the content type discriminator,
    /// then paging and shaping, then field filters.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("content_type".to_string(), self.content_type.to_string())];
        if let Some(order) = self.order {
            params.push(("order".to_string(), order.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(skip) = self.skip {
            params.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(include) = self.include {
            params.push(("include".to_string(), include.to_string()));
        }
        if let Some(select) = self.select {
            params.push(("select".to_string(), select.to_string()));
        }
        for filter in &self.filters {
            filter.push_params(&mut params);
        }
        params
    }
}

/// Builds the store query for a publication listing.
///
/// Listings are newest-first by entry creation time. When a free-text term
/// is present the explicit ordering is dropped and the store's relevance
/// ranking applies instead.
pub fn publications(query: &PublicationQuery) -> EntryQuery {
    let mut translated = EntryQuery::new(PUBLICATION_TYPE);
    if query.text.is_none() {
        translated.order = Some("-sys.createdAt");
    }
    translated.limit = query.limit;
    translated.skip = Some(query.skip);
    translated.include = Some(INCLUDE_DEPTH);

    if let Some(slug) = &query.category_slug {
        translated.filters.push(Filter::CategorySlug(slug.clone()));
    }
    if let Some(tag) = &query.tag {
        translated.filters.push(Filter::HasTag(tag.clone()));
    }
    if let Some(text) = &query.text {
        translated.filters.push(Filter::FullText(text.clone()));
    }
    translated
}

/// Free-text search across publications, relevance ordered.
pub fn search(text: &str) -> EntryQuery {
    publications(&PublicationQuery {
        limit: None,
        skip: 0,
        category_slug: None,
        tag: None,
        text: Some(text.to_string()),
    })
}

/// Single publication lookup by slug, links resolved.
pub fn publication_by_slug(slug: &str) -> EntryQuery {
    let mut translated = EntryQuery::new(PUBLICATION_TYPE);
    translated.limit = Some(1);
    translated.include = Some(INCLUDE_DEPTH);
    translated
        .filters
        .push(Filter::FieldEquals("fields.slug", slug.to_string()));
    translated
}

/// All categories, alphabetical by name.
pub fn categories() -> EntryQuery {
    let mut translated = EntryQuery::new(CATEGORY_TYPE);
    translated.order = Some("fields.name");
    translated.include = Some(1);
    translated
}

/// Single category lookup by slug.
pub fn category_by_slug(slug: &str) -> EntryQuery {
    let mut translated = EntryQuery::new(CATEGORY_TYPE);
    translated.limit = Some(1);
    translated.include = Some(INCLUDE_DEPTH);
    translated
        .filters
        .push(Filter::FieldEquals("fields.slug", slug.to_string()));
    translated
}

/// Tag-list projection over the publication corpus. Only `fields.tags` is
/// requested, so the scan stays cheap even at the maximum page size.
pub fn tag_scan(limit: u32) -> EntryQuery {
    let mut translated = EntryQuery::new(PUBLICATION_TYPE);
    translated.limit = Some(limit);
    translated.select = Some("fields.tags");
    translated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_default_listing_params() {
        let translated = publications(&PublicationQuery::default());
        assert_eq!(
            pairs(&translated.params()),
            vec![
                ("content_type", "publication"),
                ("order", "-sys.createdAt"),
                ("limit", "10"),
                ("skip", "0"),
                ("include", "2"),
            ]
        );
    }

    #[test]
    fn test_category_and_tag_filters_combine() {
        let translated = publications(&PublicationQuery {
            category_slug: Some("engineering".to_string()),
            tag: Some("react".to_string()),
            ..PublicationQuery::default()
        });
        let params = translated.params();
        assert!(params.contains(&(
            "fields.category.sys.contentType.sys.id".to_string(),
            "category".to_string()
        )));
        assert!(params.contains(&(
            "fields.category.fields.slug".to_string(),
            "engineering".to_string()
        )));
        assert!(params.contains(&("fields.tags[in]".to_string(), "react".to_string())));
    }

    #[test]
    fn test_search_uses_relevance_order() {
        let params = search("rust cms").params();
        assert!(params.contains(&("query".to_string(), "rust cms".to_string())));
        assert!(!params.iter().any(|(key, _)| key == "order"));
        assert!(!params.iter().any(|(key, _)| key == "limit"));
    }

    #[test]
    fn test_slug_lookup_is_single_entry() {
        let params = publication_by_slug("hello-world").params();
        assert!(params.contains(&("fields.slug".to_string(), "hello-world".to_string())));
        assert!(params.contains(&("limit".to_string(), "1".to_string())));
        assert!(params.contains(&("include".to_string(), "2".to_string())));
    }

    #[test]
    fn test_categories_are_alphabetical() {
        let params = categories().params();
        assert_eq!(
            pairs(&params),
            vec![
                ("content_type", "category"),
                ("order", "fields.name"),
                ("include", "1"),
            ]
        );
    }

    #[test]
    fn test_tag_scan_projects_tags_only() {
        let params = tag_scan(1000).params();
        assert_eq!(
            pairs(&params),
            vec![
                ("content_type", "publication"),
                ("limit", "1000"),
                ("select", "fields.tags"),
            ]
        );
    }
}
