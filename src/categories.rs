//! Category retrieval operations.

use crate::error::StoreError;
use crate::models::Category;
use crate::query;
use crate::store::StoreClient;

/// All categories, alphabetical by name.
pub async fn list_categories(store: &StoreClient) -> Result<Vec<Category>, StoreError> {
    let collection = store.entries(&query::categories()).await?;
    Ok(collection.into_categories())
}

/// Looks up a single category by slug. Returns `Ok(None)` when no category
/// carries the slug.
pub async fn category_by_slug(
    store: &StoreClient,
    slug: &str,
) -> Result<Option<Category>, StoreError> {
    let collection = store.entries(&query::category_by_slug(slug)).await?;
    Ok(collection.into_categories().into_iter().next())
}
