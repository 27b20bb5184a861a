//! HTTP server: the public site and the JSON API.
//!
//! ## Pages
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Home: recent publications, categories, tag cloud |
//! | `GET /latest` | Reverse-chronological listing with a sidebar |
//! | `GET /publications/{slug}` | One publication with related reads |
//! | `GET /categories` | Category directory |
//! | `GET /categories/{slug}` | One category's publications |
//! | `GET /tags` | Tag directory |
//! | `GET /tags/{tag}` | Publications carrying one tag |
//! | `GET /search` | Search form and results |
//! | `GET /submit` | Manual submission form |
//!
//! ## API
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /api/search?q=` | Search results as JSON |
//! | `POST /api/publications` | Relays a submission form to the automation service |
//! | `POST /api/generate` | Relays a generation request to the automation service |
//! | `GET /sitemap.xml` | Sitemap over every indexable URL |
//! | `GET /robots.txt` | Crawler policy |
//! | `GET /health` | Liveness check |
//!
//! Page handlers render an error page on failure and a not-found page for
//! missing slugs; API handlers answer with a JSON error body instead. The
//! store client is built once at startup. When credentials are missing the
//! server still comes up (health and robots stay available) and every
//! store-backed route reports the configuration error.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tera::Tera;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, warn, Level};

use crate::categories;
use crate::config::Config;
use crate::error::StoreError;
use crate::models::Publication;
use crate::pages;
use crate::publications;
use crate::query::PublicationQuery;
use crate::seo;
use crate::sitemap::{self, Sitemap};
use crate::store::{StoreClient, StoreView};
use crate::tags;
use crate::webhooks::{self, FormField};

const HOME_PUBLICATIONS: u32 = 7;
const HOME_TAG_CLOUD: usize = 20;
const LATEST_PAGE_SIZE: u32 = 12;
const SIDEBAR_CATEGORIES: usize = 5;
const SIDEBAR_TAGS: usize = 15;
const RELATED_PUBLICATIONS: u32 = 3;
const CATEGORY_PAGE_SIZE: u32 = 100;
const TAG_PAGE_SIZE: u32 = 100;
const POPULAR_TAGS: usize = 20;

/// Rendered when even the error template fails.
const FALLBACK_ERROR_HTML: &str =
    "<!doctype html><title>Something went wrong</title><h1>Something went wrong</h1>";

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Option<Arc<StoreClient>>,
    templates: Arc<Tera>,
}

impl AppState {
    fn store(&self) -> Result<&StoreClient, StoreError> {
        self.store
            .as_deref()
            .ok_or(StoreError::NotConfigured("store.space_id / store.access_token"))
    }
}

/// Starts the server and blocks until it stops.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let templates = pages::engine()?;
    let store = match StoreClient::new(&config.store, StoreView::Delivery) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) if err.is_configuration() => {
            warn!(error = %err, "starting without a content store; store-backed routes will fail");
            None
        }
        Err(err) => return Err(err.into()),
    };

    let state = AppState {
        config: Arc::new(config.clone()),
        store,
        templates: Arc::new(templates),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let app = Router::new()
        .route("/", get(handle_home))
        .route("/latest", get(handle_latest))
        .route("/publications/{slug}", get(handle_publication))
        .route("/categories", get(handle_categories))
        .route("/categories/{slug}", get(handle_category))
        .route("/tags", get(handle_tags))
        .route("/tags/{tag}", get(handle_tag))
        .route("/search", get(handle_search_page))
        .route("/submit", get(handle_submit_page))
        .route("/api/search", get(handle_api_search))
        .route("/api/publications", post(handle_submit_publication))
        .route("/api/generate", post(handle_generate))
        .route("/sitemap.xml", get(handle_sitemap))
        .route("/robots.txt", get(handle_robots))
        .route("/health", get(handle_health))
        .fallback(handle_fallback)
        .layer(cors)
        .layer(trace)
        .with_state(state);

    println!("Pressroom server listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Page plumbing ============

fn page_response(state: &AppState, result: anyhow::Result<Option<String>>) -> Response {
    match result {
        Ok(Some(html)) => Html(html).into_response(),
        Ok(None) => not_found_response(state),
        Err(err) => error_response(state, &err),
    }
}

fn not_found_response(state: &AppState) -> Response {
    let html = pages::render_not_found(&state.templates, &state.config.site)
        .unwrap_or_else(|_| FALLBACK_ERROR_HTML.to_string());
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

/// Details stay in the log; readers get a generic error page.
fn error_response(state: &AppState, err: &anyhow::Error) -> Response {
    error!(error = %err, "page request failed");
    let html = pages::render_error(&state.templates, &state.config.site)
        .unwrap_or_else(|_| FALLBACK_ERROR_HTML.to_string());
    (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
}

async fn handle_fallback(State(state): State<AppState>) -> Response {
    not_found_response(&state)
}

// ============ Pages ============

async fn handle_home(State(state): State<AppState>) -> Response {
    page_response(&state, home_page(&state).await)
}

async fn home_page(state: &AppState) -> anyhow::Result<Option<String>> {
    let store = state.store()?;
    let recent = PublicationQuery {
        limit: Some(HOME_PUBLICATIONS),
        ..PublicationQuery::default()
    };
    let (featured, categories, vocabulary) = tokio::try_join!(
        publications::list_publications(store, recent),
        categories::list_categories(store),
        tags::all_tags(store, state.config.store.max_scan_limit),
    )?;
    let cloud: Vec<String> = vocabulary.into_iter().take(HOME_TAG_CLOUD).collect();
    let html = pages::render_home(
        &state.templates,
        &state.config.site,
        &featured.items,
        &categories,
        &cloud,
    )?;
    Ok(Some(html))
}

async fn handle_latest(State(state): State<AppState>) -> Response {
    page_response(&state, latest_page(&state).await)
}

async fn latest_page(state: &AppState) -> anyhow::Result<Option<String>> {
    let store = state.store()?;
    let recent = PublicationQuery {
        limit: Some(LATEST_PAGE_SIZE),
        ..PublicationQuery::default()
    };
    let (latest, categories, vocabulary) = tokio::try_join!(
        publications::list_publications(store, recent),
        categories::list_categories(store),
        tags::all_tags(store, state.config.store.max_scan_limit),
    )?;
    let sidebar_categories: Vec<_> = categories.into_iter().take(SIDEBAR_CATEGORIES).collect();
    let sidebar_tags: Vec<_> = vocabulary.into_iter().take(SIDEBAR_TAGS).collect();
    let html = pages::render_latest(
        &state.templates,
        &state.config.site,
        &latest.items,
        &sidebar_categories,
        &sidebar_tags,
    )?;
    Ok(Some(html))
}

async fn handle_publication(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    page_response(&state, publication_page(&state, &slug).await)
}

async fn publication_page(state: &AppState, slug: &str) -> anyhow::Result<Option<String>> {
    let store = state.store()?;
    let publication = match publications::publication_by_slug(store, slug).await? {
        Some(publication) => publication,
        None => return Ok(None),
    };
    let related =
        publications::related_publications(store, &publication, RELATED_PUBLICATIONS).await?;
    let html = pages::render_publication(
        &state.templates,
        &state.config.site,
        &publication,
        &related,
    )?;
    Ok(Some(html))
}

async fn handle_categories(State(state): State<AppState>) -> Response {
    page_response(&state, categories_page(&state).await)
}

async fn categories_page(state: &AppState) -> anyhow::Result<Option<String>> {
    let store = state.store()?;
    let categories = categories::list_categories(store).await?;
    let html = pages::render_categories(&state.templates, &state.config.site, &categories)?;
    Ok(Some(html))
}

async fn handle_category(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    page_response(&state, category_page(&state, &slug).await)
}

async fn category_page(state: &AppState, slug: &str) -> anyhow::Result<Option<String>> {
    let store = state.store()?;
    let category = match categories::category_by_slug(store, slug).await? {
        Some(category) => category,
        None => return Ok(None),
    };
    let filters = PublicationQuery {
        limit: Some(CATEGORY_PAGE_SIZE),
        category_slug: Some(category.slug.clone()),
        ..PublicationQuery::default()
    };
    let results = publications::list_publications(store, filters).await?;
    let popular = tags::rank_tags(&results.items, POPULAR_TAGS);
    let html = pages::render_category(
        &state.templates,
        &state.config.site,
        &category,
        &results.items,
        &popular,
    )?;
    Ok(Some(html))
}

async fn handle_tags(State(state): State<AppState>) -> Response {
    page_response(&state, tags_page(&state).await)
}

async fn tags_page(state: &AppState) -> anyhow::Result<Option<String>> {
    let store = state.store()?;
    let vocabulary = tags::all_tags(store, state.config.store.max_scan_limit).await?;
    let html = pages::render_tags(&state.templates, &state.config.site, &vocabulary)?;
    Ok(Some(html))
}

async fn handle_tag(State(state): State<AppState>, Path(tag): Path<String>) -> Response {
    page_response(&state, tag_page(&state, &tag).await)
}

/// A tag nothing carries is not part of the vocabulary, so it 404s rather
/// than rendering an empty listing.
async fn tag_page(state: &AppState, tag: &str) -> anyhow::Result<Option<String>> {
    let store = state.store()?;
    let filters = PublicationQuery {
        limit: Some(TAG_PAGE_SIZE),
        tag: Some(tag.to_string()),
        ..PublicationQuery::default()
    };
    let results = publications::list_publications(store, filters).await?;
    if results.items.is_empty() {
        return Ok(None);
    }
    let html = pages::render_tag(
        &state.templates,
        &state.config.site,
        tag,
        &results.items,
        results.total,
    )?;
    Ok(Some(html))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn handle_search_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    page_response(&state, search_page(&state, params.q.as_deref()).await)
}

async fn search_page(state: &AppState, q: Option<&str>) -> anyhow::Result<Option<String>> {
    let site = &state.config.site;
    let query = q.unwrap_or("");
    if query.trim().is_empty() {
        let html = pages::render_search(&state.templates, site, query, None)?;
        return Ok(Some(html));
    }
    let store = state.store()?;
    let results = publications::search_publications(store, query).await?;
    let html = pages::render_search(&state.templates, site, query, Some(&results))?;
    Ok(Some(html))
}

async fn handle_submit_page(State(state): State<AppState>) -> Response {
    page_response(&state, submit_page(&state).await)
}

async fn submit_page(state: &AppState) -> anyhow::Result<Option<String>> {
    let store = state.store()?;
    let categories = categories::list_categories(store).await?;
    let html = pages::render_submit(&state.templates, &state.config.site, &categories)?;
    Ok(Some(html))
}

// ============ API ============

#[derive(Debug, Serialize)]
struct SearchItem {
    id: String,
    title: String,
    slug: String,
    href: String,
    author: Option<String>,
    published_at: String,
    category: Option<SearchCategory>,
    tags: Vec<String>,
    excerpt: String,
}

#[derive(Debug, Serialize)]
struct SearchCategory {
    name: String,
    slug: String,
}

impl SearchItem {
    fn new(publication: &Publication) -> Self {
        Self {
            id: publication.id.clone(),
            title: publication.title.clone(),
            slug: publication.slug.clone(),
            href: seo::publication_path(&publication.slug),
            author: publication.author.clone(),
            published_at: publication.display_date().to_rfc3339(),
            category: publication.category.as_ref().map(|category| SearchCategory {
                name: category.name.clone(),
                slug: category.slug.clone(),
            }),
            tags: publication.tags.clone(),
            excerpt: seo::extract_description(&publication.body, ""),
        }
    }
}

async fn handle_api_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let text = params.q.unwrap_or_default();
    if text.trim().is_empty() {
        return Json(json!({ "items": [], "total": 0 })).into_response();
    }

    let result = match state.store() {
        Ok(store) => publications::search_publications(store, &text).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(results) => {
            let items: Vec<SearchItem> = results.items.iter().map(SearchItem::new).collect();
            Json(json!({ "items": items, "total": results.total })).into_response()
        }
        Err(err) => {
            error!(error = %err, "search request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "search failed", "items": [] })),
            )
                .into_response()
        }
    }
}

async fn handle_submit_publication(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut fields = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                // Metadata must be taken before `bytes()` consumes the field.
                let name = field.name().unwrap_or_default().to_string();
                let file_name = field.file_name().map(|name| name.to_string());
                let content_type = field.content_type().map(|mime| mime.to_string());
                match field.bytes().await {
                    Ok(data) => fields.push(FormField {
                        name,
                        file_name,
                        content_type,
                        data: data.to_vec(),
                    }),
                    Err(err) => {
                        error!(error = %err, "could not read submission field");
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "error": "invalid form submission" })),
                        )
                            .into_response();
                    }
                }
            }
            Ok(None) => break,
            Err(err) => {
                error!(error = %err, "could not parse submission form");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "invalid form submission" })),
                )
                    .into_response();
            }
        }
    }

    match webhooks::forward_submission(&state.config, fields).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => {
            error!(error = %err, "submission forwarding failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "submission failed" })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let prompt = request.prompt.as_deref().unwrap_or("").trim();
    if prompt.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "prompt must not be empty" })),
        )
            .into_response();
    }

    match webhooks::forward_generation(&state.config, prompt, request.category.as_deref()).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => {
            error!(error = %err, "generation forwarding failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "content generation failed" })),
            )
                .into_response()
        }
    }
}

// ============ Feeds and health ============

async fn handle_sitemap(State(state): State<AppState>) -> Response {
    match sitemap_xml(&state).await {
        Ok(xml) => (
            [
                (header::CONTENT_TYPE, "application/xml; charset=utf-8"),
                (
                    header::CACHE_CONTROL,
                    "public, s-maxage=3600, stale-while-revalidate=59",
                ),
            ],
            xml,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "sitemap generation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "sitemap unavailable").into_response()
        }
    }
}

async fn sitemap_xml(state: &AppState) -> anyhow::Result<String> {
    let store = state.store()?;
    let scan = PublicationQuery {
        limit: Some(state.config.store.max_scan_limit),
        ..PublicationQuery::default()
    };
    let (publications, categories, vocabulary) = tokio::try_join!(
        publications::list_publications(store, scan),
        categories::list_categories(store),
        tags::all_tags(store, state.config.store.max_scan_limit),
    )?;
    let sitemap = Sitemap::build(
        &state.config.site,
        &publications.items,
        &categories,
        &vocabulary,
    );
    Ok(sitemap.into_xml())
}

async fn handle_robots(State(state): State<AppState>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        sitemap::robots_txt(&state.config.site),
    )
        .into_response()
}

async fn handle_health() -> Response {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") })).into_response()
}
