//! Proxies to the publishing automation service.
//!
//! Two flows exist: a manual submission form relayed as multipart, and a
//! generation request relayed as JSON with the store credentials attached so
//! the automation service can write the resulting draft back. The service's
//! response body is relayed to the caller verbatim; a non-success status from
//! the service is logged with its body and surfaced as an error.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::error;

use crate::config::Config;

/// One field of a submission form, already read out of the incoming request.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

fn client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to build webhook HTTP client")
}

/// Forwards a manual submission form to the automation service unchanged.
pub async fn forward_submission(config: &Config, fields: Vec<FormField>) -> Result<Value> {
    let url = config
        .webhooks
        .manual_url
        .as_deref()
        .context("webhooks.manual_url is not configured")?;

    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        let mut part = reqwest::multipart::Part::bytes(field.data);
        if let Some(file_name) = field.file_name {
            part = part.file_name(file_name);
        }
        if let Some(content_type) = &field.content_type {
            part = part
                .mime_str(content_type)
                .with_context(|| format!("invalid content type on form field {}", field.name))?;
        }
        form = form.part(field.name, part);
    }

    relay(client(config.webhooks.timeout_secs)?.post(url).multipart(form)).await
}

/// Forwards a generation request as JSON, attaching the store credentials.
pub async fn forward_generation(
    config: &Config,
    prompt: &str,
    category: Option<&str>,
) -> Result<Value> {
    let url = config
        .webhooks
        .auto_url
        .as_deref()
        .context("webhooks.auto_url is not configured")?;

    let body = json!({
        "prompt": prompt,
        "category": category,
        "spaceId": config.store.space_id,
        "accessToken": config.store.access_token,
    });

    relay(client(config.webhooks.timeout_secs)?.post(url).json(&body)).await
}

async fn relay(request: reqwest::RequestBuilder) -> Result<Value> {
    let response = request.send().await.context("webhook request failed")?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "automation service rejected the request");
        bail!("automation service returned HTTP {status}");
    }

    let body = response
        .text()
        .await
        .context("could not read webhook response")?;
    if body.is_empty() {
        // Some automation flows acknowledge with an empty 200.
        return Ok(json!({ "ok": true }));
    }
    serde_json::from_str(&body).context("webhook response was not valid JSON")
}
