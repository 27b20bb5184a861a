//! Server-rendered pages and their view models.
//!
//! Templates are embedded at compile time and rendered with Tera. Each page
//! has a `render_*` function that derives the view model from the entity
//! types; route handlers stay thin and never touch template context
//! directly. Entity fields are escaped by the engine; only pre-rendered
//! fragments (the publication body, JSON-LD blocks) are marked safe.

use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::models::{Category, Publication, ResultSet};
use crate::richtext;
use crate::seo::{self, PageMeta};

/// Builds the template engine with every page registered.
pub fn engine() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("layout.html", include_str!("../templates/layout.html")),
        (
            "publication_card.html",
            include_str!("../templates/publication_card.html"),
        ),
        ("home.html", include_str!("../templates/home.html")),
        ("latest.html", include_str!("../templates/latest.html")),
        (
            "publication.html",
            include_str!("../templates/publication.html"),
        ),
        (
            "categories.html",
            include_str!("../templates/categories.html"),
        ),
        ("category.html", include_str!("../templates/category.html")),
        ("tags.html", include_str!("../templates/tags.html")),
        ("tag.html", include_str!("../templates/tag.html")),
        ("search.html", include_str!("../templates/search.html")),
        ("submit.html", include_str!("../templates/submit.html")),
        (
            "not_found.html",
            include_str!("../templates/not_found.html"),
        ),
        ("error.html", include_str!("../templates/error.html")),
    ])?;
    Ok(tera)
}

// ============ View models ============

#[derive(Debug, Serialize)]
struct SiteView {
    name: String,
    description: String,
}

impl SiteView {
    fn new(site: &SiteConfig) -> Self {
        Self {
            name: site.name.clone(),
            description: site.description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagLink {
    pub name: String,
    pub href: String,
}

pub fn tag_links(tags: &[String]) -> Vec<TagLink> {
    tags.iter()
        .map(|tag| TagLink {
            name: tag.clone(),
            href: seo::tag_path(tag),
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct CategoryRef {
    name: String,
    href: String,
}

/// A publication as shown in listings and article headers.
#[derive(Debug, Serialize)]
pub struct PublicationCard {
    title: String,
    href: String,
    author: Option<String>,
    category: Option<CategoryRef>,
    date_iso: String,
    date_display: String,
    excerpt: Option<String>,
    image_url: Option<String>,
    tags: Vec<TagLink>,
}

impl PublicationCard {
    fn new(publication: &Publication) -> Self {
        let date = publication.display_date();
        let excerpt = seo::extract_description(&publication.body, "");
        Self {
            title: publication.title.clone(),
            href: seo::publication_path(&publication.slug),
            author: publication.author.clone(),
            category: publication.category.as_ref().map(|category| CategoryRef {
                name: category.name.clone(),
                href: seo::category_path(&category.slug),
            }),
            date_iso: date.to_rfc3339(),
            date_display: date.format("%B %d, %Y").to_string(),
            excerpt: if excerpt.is_empty() {
                None
            } else {
                Some(excerpt)
            },
            image_url: publication
                .featured_image
                .as_ref()
                .map(|image| image.https_url()),
            tags: tag_links(&publication.tags),
        }
    }
}

fn cards(publications: &[Publication]) -> Vec<PublicationCard> {
    publications.iter().map(PublicationCard::new).collect()
}

#[derive(Debug, Serialize)]
pub struct CategoryCard {
    name: String,
    slug: String,
    href: String,
    description: Option<String>,
    image_url: Option<String>,
}

impl CategoryCard {
    fn new(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            href: seo::category_path(&category.slug),
            description: category.description.clone(),
            image_url: category.image.as_ref().map(|image| image.https_url()),
        }
    }
}

fn category_cards(categories: &[Category]) -> Vec<CategoryCard> {
    categories.iter().map(CategoryCard::new).collect()
}

fn base_context(site: &SiteConfig, meta: &PageMeta) -> Context {
    let mut context = Context::new();
    context.insert("site", &SiteView::new(site));
    context.insert("meta", meta);
    context
}

// ============ Pages ============

pub fn render_home(
    tera: &Tera,
    site: &SiteConfig,
    publications: &[Publication],
    categories: &[Category],
    tags: &[String],
) -> tera::Result<String> {
    let meta = seo::home_meta(site);
    let mut context = base_context(site, &meta);
    context.insert("publications", &cards(publications));
    context.insert("categories", &category_cards(categories));
    context.insert("tags", &tag_links(tags));
    tera.render("home.html", &context)
}

pub fn render_latest(
    tera: &Tera,
    site: &SiteConfig,
    publications: &[Publication],
    sidebar_categories: &[Category],
    sidebar_tags: &[String],
) -> tera::Result<String> {
    let meta = seo::page_meta(
        site,
        "Latest publications",
        "The most recent publications across every category.",
        "/latest",
    );
    let mut context = base_context(site, &meta);
    context.insert("publications", &cards(publications));
    context.insert("sidebar_categories", &category_cards(sidebar_categories));
    context.insert("sidebar_tags", &tag_links(sidebar_tags));
    tera.render("latest.html", &context)
}

pub fn render_publication(
    tera: &Tera,
    site: &SiteConfig,
    publication: &Publication,
    related: &[Publication],
) -> tera::Result<String> {
    let meta = seo::publication_meta(site, publication);
    let mut context = base_context(site, &meta);
    context.insert("publication", &PublicationCard::new(publication));
    context.insert("body_html", &richtext::render_html(&publication.body));
    context.insert("related", &cards(related));
    tera.render("publication.html", &context)
}

pub fn render_categories(
    tera: &Tera,
    site: &SiteConfig,
    categories: &[Category],
) -> tera::Result<String> {
    let meta = seo::page_meta(
        site,
        "Categories",
        "Every editorial category on the site.",
        "/categories",
    );
    let mut context = base_context(site, &meta);
    context.insert("categories", &category_cards(categories));
    tera.render("categories.html", &context)
}

pub fn render_category(
    tera: &Tera,
    site: &SiteConfig,
    category: &Category,
    publications: &[Publication],
    popular_tags: &[String],
) -> tera::Result<String> {
    let meta = seo::category_meta(site, category);
    let mut context = base_context(site, &meta);
    context.insert("category", &CategoryCard::new(category));
    context.insert("publications", &cards(publications));
    context.insert("popular_tags", &tag_links(popular_tags));
    tera.render("category.html", &context)
}

pub fn render_tags(tera: &Tera, site: &SiteConfig, tags: &[String]) -> tera::Result<String> {
    let meta = seo::page_meta(
        site,
        "Tags",
        "Every tag used across the publication corpus.",
        "/tags",
    );
    let mut context = base_context(site, &meta);
    context.insert("tags", &tag_links(tags));
    tera.render("tags.html", &context)
}

pub fn render_tag(
    tera: &Tera,
    site: &SiteConfig,
    tag: &str,
    publications: &[Publication],
    total: u32,
) -> tera::Result<String> {
    let meta = seo::tag_meta(site, tag);
    let mut context = base_context(site, &meta);
    context.insert("tag", tag);
    context.insert("total", &total);
    context.insert("publications", &cards(publications));
    tera.render("tag.html", &context)
}

/// Search page. `results` is `None` until the reader submits a query, so the
/// form renders without an empty-state message underneath it.
pub fn render_search(
    tera: &Tera,
    site: &SiteConfig,
    query: &str,
    results: Option<&ResultSet>,
) -> tera::Result<String> {
    let meta = seo::page_meta(
        site,
        "Search",
        "Search every publication on the site.",
        "/search",
    );
    let mut context = base_context(site, &meta);
    context.insert("query", query);
    context.insert("searched", &results.is_some());
    match results {
        Some(set) => {
            context.insert("results", &cards(&set.items));
            context.insert("total", &set.total);
        }
        None => {
            context.insert("results", &Vec::<PublicationCard>::new());
            context.insert("total", &0u32);
        }
    }
    tera.render("search.html", &context)
}

pub fn render_submit(
    tera: &Tera,
    site: &SiteConfig,
    categories: &[Category],
) -> tera::Result<String> {
    let meta = seo::page_meta(
        site,
        "Submit a publication",
        "Send a draft to the editorial team for review.",
        "/submit",
    );
    let mut context = base_context(site, &meta);
    context.insert("categories", &category_cards(categories));
    tera.render("submit.html", &context)
}

pub fn render_not_found(tera: &Tera, site: &SiteConfig) -> tera::Result<String> {
    let meta = seo::page_meta(site, "Page not found", &site.description, "/");
    let context = base_context(site, &meta);
    tera.render("not_found.html", &context)
}

pub fn render_error(tera: &Tera, site: &SiteConfig) -> tera::Result<String> {
    let meta = seo::page_meta(site, "Something went wrong", &site.description, "/");
    let context = base_context(site, &meta);
    tera.render("error.html", &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_publication() -> Publication {
        Publication::from_entry(json!({
            "sys": {
                "id": "pub-1",
                "createdAt": "2024-01-05T10:00:00Z",
                "updatedAt": "2024-02-01T08:30:00Z"
            },
            "fields": {
                "title": "Shipping a headless frontend",
                "slug": "shipping-a-headless-frontend",
                "author": "Dana Reyes",
                "tags": ["architecture", "cms"],
                "category": {
                    "sys": {
                        "id": "cat-1",
                        "createdAt": "2023-11-01T00:00:00Z",
                        "updatedAt": "2023-11-01T00:00:00Z"
                    },
                    "fields": { "name": "Engineering", "slug": "engineering" }
                },
                "body": {
                    "content": [
                        { "nodeType": "paragraph", "content": [
                            { "nodeType": "text", "value": "How we replaced the monolith." }
                        ] }
                    ]
                }
            }
        }))
        .unwrap()
    }

    fn sample_category() -> Category {
        Category::from_entry(json!({
            "sys": {
                "id": "cat-1",
                "createdAt": "2023-11-01T00:00:00Z",
                "updatedAt": "2023-11-01T00:00:00Z"
            },
            "fields": { "name": "Engineering", "slug": "engineering", "description": "Build logs" }
        }))
        .unwrap()
    }

    #[test]
    fn test_engine_parses_all_templates() {
        engine().unwrap();
    }

    #[test]
    fn test_home_renders_cards_and_sections() {
        let tera = engine().unwrap();
        let site = SiteConfig::default();
        let html = render_home(
            &tera,
            &site,
            &[sample_publication()],
            &[sample_category()],
            &["architecture".to_string()],
        )
        .unwrap();
        assert!(html.contains("Shipping a headless frontend"));
        assert!(html.contains("/publications/shipping-a-headless-frontend"));
        assert!(html.contains("/categories/engineering"));
        assert!(html.contains("/tags/architecture"));
        assert!(html.contains("application/ld+json"));
    }

    #[test]
    fn test_publication_page_embeds_body_html() {
        let tera = engine().unwrap();
        let site = SiteConfig::default();
        let publication = sample_publication();
        let html = render_publication(&tera, &site, &publication, &[]).unwrap();
        assert!(html.contains("<p>How we replaced the monolith.</p>"));
        assert!(html.contains("article:published_time"));
        assert!(html.contains("og:type\" content=\"article\""));
    }

    #[test]
    fn test_search_page_without_query_shows_only_form() {
        let tera = engine().unwrap();
        let site = SiteConfig::default();
        let html = render_search(&tera, &site, "", None).unwrap();
        assert!(html.contains("<form class=\"search\""));
        assert!(!html.contains("result(s) for"));
        assert!(!html.contains("No publications matched"));
    }

    #[test]
    fn test_search_page_with_empty_results_shows_empty_state() {
        let tera = engine().unwrap();
        let site = SiteConfig::default();
        let html = render_search(&tera, &site, "nothing", Some(&ResultSet::empty())).unwrap();
        assert!(html.contains("No publications matched"));
    }

    #[test]
    fn test_not_found_and_error_pages_render() {
        let tera = engine().unwrap();
        let site = SiteConfig::default();
        assert!(render_not_found(&tera, &site).unwrap().contains("Page not found"));
        assert!(render_error(&tera, &site)
            .unwrap()
            .contains("Something went wrong"));
    }

    #[test]
    fn test_entity_text_is_escaped_by_the_engine() {
        let tera = engine().unwrap();
        let site = SiteConfig {
            name: "A&B <Press>".to_string(),
            ..SiteConfig::default()
        };
        let html = render_not_found(&tera, &site).unwrap();
        assert!(html.contains("A&amp;B &lt;Press&gt;"));
    }
}
