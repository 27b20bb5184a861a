//! XML sitemap and robots policy.

use std::borrow::Cow;

use crate::config::SiteConfig;
use crate::models::{Category, Publication};
use crate::seo;

/// A single `<url>` element.
#[derive(Debug, Clone)]
pub struct UrlEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

/// The full sitemap for one render of the site.
#[derive(Debug, Clone, Default)]
pub struct Sitemap {
    pub urls: Vec<UrlEntry>,
}

impl Sitemap {
    /// Collects every indexable URL: the static sections, then publications
    /// (with last-modified stamps), categories, and tag pages.
    pub fn build(
        site: &SiteConfig,
        publications: &[Publication],
        categories: &[Category],
        tags: &[String],
    ) -> Self {
        let mut urls = vec![
            UrlEntry {
                loc: site.absolute_url("/"),
                lastmod: None,
                changefreq: "daily",
                priority: "1.0",
            },
            UrlEntry {
                loc: site.absolute_url("/latest"),
                lastmod: None,
                changefreq: "daily",
                priority: "0.8",
            },
            UrlEntry {
                loc: site.absolute_url("/categories"),
                lastmod: None,
                changefreq: "weekly",
                priority: "0.8",
            },
            UrlEntry {
                loc: site.absolute_url("/tags"),
                lastmod: None,
                changefreq: "weekly",
                priority: "0.8",
            },
        ];

        for publication in publications {
            urls.push(UrlEntry {
                loc: site.absolute_url(&seo::publication_path(&publication.slug)),
                lastmod: Some(publication.updated_at.to_rfc3339()),
                changefreq: "monthly",
                priority: "0.6",
            });
        }
        for category in categories {
            urls.push(UrlEntry {
                loc: site.absolute_url(&seo::category_path(&category.slug)),
                lastmod: None,
                changefreq: "weekly",
                priority: "0.7",
            });
        }
        for tag in tags {
            urls.push(UrlEntry {
                loc: site.absolute_url(&seo::tag_path(tag)),
                lastmod: None,
                changefreq: "weekly",
                priority: "0.5",
            });
        }

        Self { urls }
    }

    /// Serializes to the sitemap.org XML format.
    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(self.urls.len() * 120 + 128);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
        for url in &self.urls {
            xml.push_str("  <url>\n");
            xml.push_str("    <loc>");
            xml.push_str(&escape_xml(&url.loc));
            xml.push_str("</loc>\n");
            if let Some(lastmod) = &url.lastmod {
                xml.push_str("    <lastmod>");
                xml.push_str(&escape_xml(lastmod));
                xml.push_str("</lastmod>\n");
            }
            xml.push_str("    <changefreq>");
            xml.push_str(url.changefreq);
            xml.push_str("</changefreq>\n");
            xml.push_str("    <priority>");
            xml.push_str(url.priority);
            xml.push_str("</priority>\n");
            xml.push_str("  </url>\n");
        }
        xml.push_str("</urlset>\n");
        xml
    }
}

/// Crawl policy: the HTML site is open, the JSON API is not.
pub fn robots_txt(site: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /api/\n\nHost: {base}\nSitemap: {base}/sitemap.xml\n",
        base = site.base_url
    )
}

fn escape_xml(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut escaped = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}
