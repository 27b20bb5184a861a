//! Tag vocabulary and frequency ranking.
//!
//! Tags live as free-form string lists on each publication; the store has no
//! tag entity to query. The vocabulary is therefore derived by scanning the
//! publication corpus (projected down to `fields.tags`) and aggregating
//! client-side.

use std::collections::{HashMap, HashSet};

use crate::error::StoreError;
use crate::models::Publication;
use crate::query;
use crate::store::StoreClient;

/// Distinct tags across the given tag lists, in first-seen order.
pub fn distinct_tags<I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for list in lists {
        for tag in list {
            if seen.insert(tag.clone()) {
                tags.push(tag);
            }
        }
    }
    tags
}

/// Tags with their usage counts, most used first. Ties keep first-seen
/// order, so the ranking is deterministic for a given corpus order.
pub fn count_tags<I>(lists: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut order = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for list in lists {
        for tag in list {
            if !counts.contains_key(&tag) {
                order.push(tag.clone());
            }
            *counts.entry(tag).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|tag| {
            let count = counts[&tag];
            (tag, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// The `top` most used tags among the given publications.
pub fn rank_tags(publications: &[Publication], top: usize) -> Vec<String> {
    count_tags(publications.iter().map(|publication| publication.tags.clone()))
        .into_iter()
        .take(top)
        .map(|(tag, _)| tag)
        .collect()
}

/// The full tag vocabulary, scanning up to `max_scan` publications.
pub async fn all_tags(store: &StoreClient, max_scan: u32) -> Result<Vec<String>, StoreError> {
    let collection = store.entries(&query::tag_scan(max_scan)).await?;
    Ok(distinct_tags(collection.tag_lists()))
}

/// Vocabulary with usage counts, for the terminal report.
pub async fn tag_usage(
    store: &StoreClient,
    max_scan: u32,
) -> Result<Vec<(String, usize)>, StoreError> {
    let collection = store.entries(&query::tag_scan(max_scan)).await?;
    Ok(count_tags(collection.tag_lists()))
}
