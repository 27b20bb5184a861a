//! Publication retrieval operations.

use crate::error::StoreError;
use crate::models::{Publication, ResultSet};
use crate::query::{self, PublicationQuery};
use crate::store::StoreClient;

/// Lists publications matching the given filters.
///
/// A free-text term that is empty or whitespace-only short-circuits to an
/// empty result set without asking the store.
pub async fn list_publications(
    store: &StoreClient,
    mut filters: PublicationQuery,
) -> Result<ResultSet, StoreError> {
    if let Some(text) = &filters.text {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(ResultSet::empty());
        }
        filters.text = Some(trimmed.to_string());
    }

    let collection = store.entries(&query::publications(&filters)).await?;
    let (total, skip, limit) = (collection.total, collection.skip, collection.limit);
    Ok(ResultSet {
        items: collection.into_publications(),
        total,
        skip,
        limit,
    })
}

/// Full-text search across publications, relevance ordered.
pub async fn search_publications(
    store: &StoreClient,
    text: &str,
) -> Result<ResultSet, StoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(ResultSet::empty());
    }

    let collection = store.entries(&query::search(trimmed)).await?;
    let (total, skip, limit) = (collection.total, collection.skip, collection.limit);
    Ok(ResultSet {
        items: collection.into_publications(),
        total,
        skip,
        limit,
    })
}

/// Looks up a single publication by slug with its links resolved.
/// Returns `Ok(None)` when no entry carries the slug.
pub async fn publication_by_slug(
    store: &StoreClient,
    slug: &str,
) -> Result<Option<Publication>, StoreError> {
    let collection = store.entries(&query::publication_by_slug(slug)).await?;
    Ok(collection.into_publications().into_iter().next())
}

/// Publications from the same category, excluding the publication itself.
/// A publication without a category has no related set.
pub async fn related_publications(
    store: &StoreClient,
    publication: &Publication,
    limit: u32,
) -> Result<Vec<Publication>, StoreError> {
    let category = match &publication.category {
        Some(category) => category,
        None => return Ok(Vec::new()),
    };

    // Fetch one extra so the exclusion below cannot leave the set short.
    let filters = PublicationQuery {
        limit: Some(limit + 1),
        category_slug: Some(category.slug.clone()),
        ..PublicationQuery::default()
    };
    let collection = store.entries(&query::publications(&filters)).await?;
    Ok(collection
        .into_publications()
        .into_iter()
        .filter(|related| related.slug != publication.slug)
        .take(limit as usize)
        .collect())
}
