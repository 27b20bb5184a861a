//! Terminal commands behind the `press` binary.
//!
//! Each command builds its own store client and prints to stdout. `search`
//! and `get` accept `--preview` to read drafts through the preview API;
//! everything else reads the published view.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::models::Publication;
use crate::publications;
use crate::query::PublicationQuery;
use crate::richtext;
use crate::store::{StoreClient, StoreView};
use crate::tags;

fn view(preview: bool) -> StoreView {
    if preview {
        StoreView::Preview
    } else {
        StoreView::Delivery
    }
}

/// `press search`: full-text search printed as a ranked list.
pub async fn run_search(config: &Config, query: &str, preview: bool) -> Result<()> {
    let store = StoreClient::new(&config.store, view(preview))?;
    let results = publications::search_publications(&store, query).await?;
    if results.items.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!("{} match(es) for \"{}\"", results.total, query.trim());
    println!();
    for (i, publication) in results.items.iter().enumerate() {
        print_match(i + 1, publication);
    }
    Ok(())
}

fn print_match(rank: usize, publication: &Publication) {
    println!("{}. {}", rank, publication.title);
    println!("    slug: {}", publication.slug);
    if let Some(category) = &publication.category {
        println!("    category: {}", category.name);
    }
    if let Some(author) = &publication.author {
        println!("    author: {}", author);
    }
    println!(
        "    published: {}",
        publication.display_date().format("%Y-%m-%d")
    );
    if !publication.tags.is_empty() {
        println!("    tags: {}", publication.tags.join(", "));
    }
    println!();
}

/// `press get`: one publication with the rich-text markup flattened.
pub async fn run_get(config: &Config, slug: &str, preview: bool) -> Result<()> {
    let store = StoreClient::new(&config.store, view(preview))?;
    let publication = match publications::publication_by_slug(&store, slug).await? {
        Some(publication) => publication,
        None => bail!("no publication with slug: {}", slug),
    };

    println!("--- Publication ---");
    println!("id:        {}", publication.id);
    println!("title:     {}", publication.title);
    println!("slug:      {}", publication.slug);
    if let Some(ref author) = publication.author {
        println!("author:    {}", author);
    }
    if let Some(ref category) = publication.category {
        println!("category:  {} ({})", category.name, category.slug);
    }
    if !publication.tags.is_empty() {
        println!("tags:      {}", publication.tags.join(", "));
    }
    println!("published: {}", publication.display_date().to_rfc3339());
    println!("updated:   {}", publication.updated_at.to_rfc3339());
    println!();

    println!("--- Body ---");
    println!("{}", richtext::plain_text(&publication.body));

    Ok(())
}

/// `press tags`: vocabulary with usage counts, most used first.
pub async fn run_tags(config: &Config) -> Result<()> {
    let store = StoreClient::new(&config.store, StoreView::Delivery)?;
    let usage = tags::tag_usage(&store, config.store.max_scan_limit).await?;
    if usage.is_empty() {
        println!("No tags.");
        return Ok(());
    }

    println!("{:<28} USES", "TAG");
    for (tag, count) in usage {
        println!("{:<28} {}", tag, count);
    }
    Ok(())
}

/// `press status`: configuration summary plus a one-entry store probe.
pub async fn run_status(config: &Config) -> Result<()> {
    println!("site:         {} <{}>", config.site.name, config.site.base_url);
    println!("environment:  {}", config.store.environment);
    println!("delivery url: {}", config.store.delivery_url);
    println!(
        "credentials:  space {}, token {}",
        set_or_missing(config.store.space_id.is_some()),
        set_or_missing(config.store.access_token.is_some()),
    );
    println!(
        "webhooks:     manual {}, generation {}",
        set_or_not(config.webhooks.manual_url.is_some()),
        set_or_not(config.webhooks.auto_url.is_some()),
    );

    let store = match StoreClient::new(&config.store, StoreView::Delivery) {
        Ok(store) => store,
        Err(err) => {
            println!("store:        NOT CONFIGURED ({})", err);
            return Ok(());
        }
    };

    let probe = PublicationQuery {
        limit: Some(1),
        ..PublicationQuery::default()
    };
    match publications::list_publications(&store, probe).await {
        Ok(results) => {
            println!("store:        OK ({} publication(s) visible)", results.total);
        }
        Err(err) => {
            println!("store:        ERROR ({})", err);
        }
    }
    Ok(())
}

fn set_or_missing(set: bool) -> &'static str {
    if set {
        "set"
    } else {
        "MISSING"
    }
}

fn set_or_not(set: bool) -> &'static str {
    if set {
        "set"
    } else {
        "not set"
    }
}
