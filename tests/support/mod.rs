#![allow(dead_code)]

//! In-process fakes for integration tests: a content store serving the
//! entries endpoint over canned fixtures, and an automation service that
//! echoes what it receives.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use pressroom::config::StoreConfig;

pub const SPACE_ID: &str = "testspace";
pub const TOKEN: &str = "test-token";

/// Binds an ephemeral port and serves the router in the background.
async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    addr
}

// ─── Fake content store ─────────────────────────────────────────────

struct StoreData {
    publications: Vec<Value>,
    categories: Vec<Value>,
    assets: Vec<Value>,
    category_ids: HashMap<String, String>,
    hits: AtomicU64,
    requests: Mutex<Vec<HashMap<String, String>>>,
}

pub struct FakeStore {
    pub base_url: String,
    data: Arc<StoreData>,
}

impl FakeStore {
    pub async fn start() -> Self {
        let categories = vec![
            category_entry("cat-eng", "Engineering", "engineering", "Build logs from the team"),
            category_entry("cat-mkt", "Marketing", "marketing", "Growing the readership"),
        ];
        let category_ids = categories
            .iter()
            .map(|category| {
                (
                    category["fields"]["slug"].as_str().unwrap().to_string(),
                    category["sys"]["id"].as_str().unwrap().to_string(),
                )
            })
            .collect();

        let data = Arc::new(StoreData {
            publications: vec![
                publication_entry(
                    "p1",
                    "Shipping a Headless Frontend",
                    "shipping-a-headless-frontend",
                    Some("Dana Reyes"),
                    Some("cat-eng"),
                    &["architecture", "cms"],
                    "How we replaced the monolith with a content pipeline.",
                    "2024-03-01T09:00:00Z",
                    true,
                ),
                publication_entry(
                    "p2",
                    "Terraform in Anger",
                    "terraform-in-anger",
                    Some("Sam Okafor"),
                    Some("cat-eng"),
                    &["infrastructure", "terraform"],
                    "Lessons from two years of infrastructure as code.",
                    "2024-02-10T09:00:00Z",
                    false,
                ),
                publication_entry(
                    "p3",
                    "Writing Release Notes People Read",
                    "writing-release-notes",
                    Some("Dana Reyes"),
                    Some("cat-mkt"),
                    &["writing", "cms"],
                    "Release notes are a marketing surface worth editing.",
                    "2024-01-20T09:00:00Z",
                    false,
                ),
                publication_entry(
                    "p4",
                    "The Quarterly Content Audit",
                    "quarterly-content-audit",
                    Some("Priya Nair"),
                    Some("cat-mkt"),
                    &["writing", "audit"],
                    "A checklist for pruning stale publications.",
                    "2023-12-05T09:00:00Z",
                    false,
                ),
                publication_entry(
                    "p5",
                    "Postmortem Culture",
                    "postmortem-culture",
                    None,
                    Some("cat-eng"),
                    &["culture"],
                    "Blameless writeups that actually change behavior.",
                    "2023-11-15T09:00:00Z",
                    false,
                ),
            ],
            categories,
            assets: vec![asset_entry(
                "asset-1",
                "Pipeline diagram",
                "//images.test/pipeline.png",
                1200,
                630,
            )],
            category_ids,
            hits: AtomicU64::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route(
                "/spaces/{space}/environments/{env}/entries",
                get(handle_entries),
            )
            .with_state(data.clone());
        let addr = serve(router).await;

        Self {
            base_url: format!("http://{}", addr),
            data,
        }
    }

    /// Store configuration pointing the delivery API at this fake.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            space_id: Some(SPACE_ID.to_string()),
            access_token: Some(TOKEN.to_string()),
            delivery_url: self.base_url.clone(),
            ..StoreConfig::default()
        }
    }

    pub fn hits(&self) -> u64 {
        self.data.hits.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<HashMap<String, String>> {
        self.data.requests.lock().unwrap().last().cloned()
    }
}

async fn handle_entries(
    State(data): State<Arc<StoreData>>,
    Path((space, _env)): Path<(String, String)>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    data.hits.fetch_add(1, Ordering::SeqCst);
    data.requests.lock().unwrap().push(params.clone());

    let expected = format!("Bearer {}", TOKEN);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == expected)
        .unwrap_or(false);
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "The access token you sent could not be found or is invalid." })),
        )
            .into_response();
    }
    if space != SPACE_ID {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "The resource could not be found." })),
        )
            .into_response();
    }

    let mut items: Vec<Value> = match params.get("content_type").map(String::as_str) {
        Some("publication") => data.publications.clone(),
        Some("category") => data.categories.clone(),
        _ => Vec::new(),
    };

    if let Some(slug) = params.get("fields.slug") {
        items.retain(|item| item["fields"]["slug"].as_str() == Some(slug));
    }
    if let Some(slug) = params.get("fields.category.fields.slug") {
        let id = data.category_ids.get(slug).cloned().unwrap_or_default();
        items.retain(|item| item["fields"]["category"]["sys"]["id"].as_str() == Some(id.as_str()));
    }
    if let Some(wanted) = params.get("fields.tags[in]") {
        let wanted: Vec<&str> = wanted.split(',').collect();
        items.retain(|item| {
            item["fields"]["tags"]
                .as_array()
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .any(|tag| wanted.contains(&tag))
                })
                .unwrap_or(false)
        });
    }
    if let Some(text) = params.get("query") {
        let needle = text.to_lowercase();
        items.retain(|item| item["fields"].to_string().to_lowercase().contains(&needle));
    }

    match params.get("order").map(String::as_str) {
        Some("-sys.createdAt") => {
            items.sort_by(|a, b| {
                b["sys"]["createdAt"]
                    .as_str()
                    .cmp(&a["sys"]["createdAt"].as_str())
            });
        }
        Some("fields.name") => {
            items.sort_by(|a, b| a["fields"]["name"].as_str().cmp(&b["fields"]["name"].as_str()));
        }
        _ => {}
    }

    let total = items.len();
    let skip: usize = params
        .get("skip")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    let limit: usize = params
        .get("limit")
        .and_then(|value| value.parse().ok())
        .unwrap_or(100);
    items = items.into_iter().skip(skip).take(limit).collect();

    if params.get("select").map(String::as_str) == Some("fields.tags") {
        items = items
            .iter()
            .map(|item| json!({ "sys": item["sys"], "fields": { "tags": item["fields"]["tags"] } }))
            .collect();
    }

    Json(json!({
        "sys": { "type": "Array" },
        "total": total,
        "skip": skip,
        "limit": limit,
        "items": items,
        "includes": { "Entry": data.categories, "Asset": data.assets }
    }))
    .into_response()
}

// ─── Fixtures ───────────────────────────────────────────────────────

fn publication_entry(
    id: &str,
    title: &str,
    slug: &str,
    author: Option<&str>,
    category_id: Option<&str>,
    tags: &[&str],
    body_text: &str,
    created_at: &str,
    with_image: bool,
) -> Value {
    let mut fields = json!({
        "title": title,
        "slug": slug,
        "tags": tags,
        "body": {
            "nodeType": "document",
            "content": [
                {
                    "nodeType": "paragraph",
                    "content": [
                        { "nodeType": "text", "value": body_text, "marks": [] }
                    ]
                }
            ]
        }
    });
    if let Some(author) = author {
        fields["author"] = json!(author);
    }
    if let Some(category_id) = category_id {
        fields["category"] = json!({
            "sys": { "type": "Link", "linkType": "Entry", "id": category_id }
        });
    }
    if with_image {
        fields["featuredImage"] = json!({
            "sys": { "type": "Link", "linkType": "Asset", "id": "asset-1" }
        });
    }

    json!({
        "sys": {
            "id": id,
            "type": "Entry",
            "createdAt": created_at,
            "updatedAt": created_at,
            "contentType": { "sys": { "id": "publication" } }
        },
        "fields": fields
    })
}

fn category_entry(id: &str, name: &str, slug: &str, description: &str) -> Value {
    json!({
        "sys": {
            "id": id,
            "type": "Entry",
            "createdAt": "2023-10-01T00:00:00Z",
            "updatedAt": "2023-10-01T00:00:00Z",
            "contentType": { "sys": { "id": "category" } }
        },
        "fields": { "name": name, "slug": slug, "description": description }
    })
}

fn asset_entry(id: &str, title: &str, url: &str, width: u32, height: u32) -> Value {
    json!({
        "sys": { "id": id, "type": "Asset" },
        "fields": {
            "title": title,
            "file": {
                "url": url,
                "contentType": "image/png",
                "details": { "image": { "width": width, "height": height } }
            }
        }
    })
}

// ─── Fake automation service ────────────────────────────────────────

pub struct FakeAutomation {
    pub manual_url: String,
    pub auto_url: String,
}

impl FakeAutomation {
    pub async fn start() -> Self {
        let router = Router::new()
            .route("/hooks/manual", post(handle_manual))
            .route("/hooks/auto", post(handle_auto));
        let addr = serve(router).await;
        Self {
            manual_url: format!("http://{}/hooks/manual", addr),
            auto_url: format!("http://{}/hooks/auto", addr),
        }
    }
}

async fn handle_manual(mut multipart: Multipart) -> Json<Value> {
    let mut received = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let _ = field.bytes().await;
        received.push(name);
    }
    Json(json!({ "ok": true, "received": received }))
}

/// Rejects prompts containing "fail" so tests can drive the error path.
async fn handle_auto(Json(body): Json<Value>) -> Response {
    let prompt = body["prompt"].as_str().unwrap_or_default();
    if prompt.contains("fail") {
        return (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": "upstream exploded" })),
        )
            .into_response();
    }
    Json(json!({
        "status": "queued",
        "prompt": prompt,
        "category": body["category"],
        "spaceId": body["spaceId"],
    }))
    .into_response()
}
