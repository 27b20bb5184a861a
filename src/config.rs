use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variables that override `[store]` credentials from the file.
pub const ENV_SPACE_ID: &str = "PRESSROOM_SPACE_ID";
pub const ENV_ACCESS_TOKEN: &str = "PRESSROOM_ACCESS_TOKEN";
pub const ENV_PREVIEW_TOKEN: &str = "PRESSROOM_PREVIEW_TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub webhooks: WebhookConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub preview_token: Option<String>,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_delivery_url")]
    pub delivery_url: String,
    #[serde(default = "default_preview_url")]
    pub preview_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_scan_limit")]
    pub max_scan_limit: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            space_id: None,
            access_token: None,
            preview_token: None,
            environment: default_environment(),
            delivery_url: default_delivery_url(),
            preview_url: default_preview_url(),
            timeout_secs: default_timeout_secs(),
            max_scan_limit: default_max_scan_limit(),
        }
    }
}

fn default_environment() -> String {
    "master".to_string()
}
fn default_delivery_url() -> String {
    "https://cdn.contentful.com".to_string()
}
fn default_preview_url() -> String {
    "https://preview.contentful.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_scan_limit() -> u32 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_site_name")]
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_site_description")]
    pub description: String,
    #[serde(default = "default_social_image")]
    pub default_og_image: String,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            base_url: default_base_url(),
            description: default_site_description(),
            default_og_image: default_social_image(),
            twitter: None,
            locale: default_locale(),
        }
    }
}

impl SiteConfig {
    /// Joins a site-relative path onto the configured base URL.
    /// Absolute URLs pass through unchanged.
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Absolute URL of the default social-sharing image.
    pub fn og_image_url(&self) -> String {
        self.absolute_url(&self.default_og_image)
    }
}

fn default_site_name() -> String {
    "Pressroom".to_string()
}
fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_site_description() -> String {
    "Ideas, guides, and stories for modern publishers.".to_string()
}
fn default_social_image() -> String {
    "/og.jpg".to_string()
}
fn default_locale() -> String {
    "en_US".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    #[serde(default)]
    pub manual_url: Option<String>,
    #[serde(default)]
    pub auto_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            manual_url: None,
            auto_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    apply_env_overrides(&mut config);

    // Validate store
    if config.store.timeout_secs == 0 {
        anyhow::bail!("store.timeout_secs must be > 0");
    }
    if config.store.max_scan_limit == 0 || config.store.max_scan_limit > 1000 {
        anyhow::bail!("store.max_scan_limit must be in 1..=1000 (the store caps pages at 1000)");
    }

    // Validate site
    if !config.site.base_url.starts_with("http://") && !config.site.base_url.starts_with("https://")
    {
        anyhow::bail!("site.base_url must start with http:// or https://");
    }
    config.site.base_url = config.site.base_url.trim_end_matches('/').to_string();

    // Validate server
    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.webhooks.timeout_secs == 0 {
        anyhow::bail!("webhooks.timeout_secs must be > 0");
    }

    Ok(config)
}

/// Credentials may come from the environment instead of the config file,
/// so tokens never have to be committed alongside the TOML.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(value) = std::env::var(ENV_SPACE_ID) {
        if !value.is_empty() {
            config.store.space_id = Some(value);
        }
    }
    if let Ok(value) = std::env::var(ENV_ACCESS_TOKEN) {
        if !value.is_empty() {
            config.store.access_token = Some(value);
        }
    }
    if let Ok(value) = std::env::var(ENV_PREVIEW_TOKEN) {
        if !value.is_empty() {
            config.store.preview_token = Some(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("pressroom.toml");
        std::fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let (_tmp, path) = write_config(
            r#"
[site]
name = "Example Press"
base_url = "https://example.com/"
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.site.name, "Example Press");
        // Trailing slash is stripped during validation.
        assert_eq!(cfg.site.base_url, "https://example.com");
        assert_eq!(cfg.store.environment, "master");
        assert_eq!(cfg.store.delivery_url, "https://cdn.contentful.com");
        assert_eq!(cfg.store.max_scan_limit, 1000);
        assert_eq!(cfg.server.bind, "127.0.0.1:8080");
        assert!(cfg.store.space_id.is_none());
        assert!(cfg.webhooks.manual_url.is_none());
    }

    #[test]
    fn test_rejects_zero_scan_limit() {
        let (_tmp, path) = write_config(
            r#"
[store]
max_scan_limit = 0
"#,
        );
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("max_scan_limit"));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let (_tmp, path) = write_config(
            r#"
[site]
base_url = "example.com"
"#,
        );
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_absolute_url_joins_paths() {
        let site = SiteConfig {
            base_url: "https://example.com".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(site.absolute_url("/og.jpg"), "https://example.com/og.jpg");
        assert_eq!(site.absolute_url("og.jpg"), "https://example.com/og.jpg");
        assert_eq!(
            site.absolute_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }
}
