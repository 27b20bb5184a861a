//! # Pressroom
//!
//! A server-rendered publishing site over a headless content store.
//!
//! Pressroom reads publications and categories from a Contentful-compatible
//! delivery API, renders them as a complete site (listings, article pages,
//! category and tag indexes, search) with SEO metadata, JSON-LD, a sitemap,
//! and a robots policy, and proxies reader submissions to an external
//! automation service.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌──────────────┐   ┌────────────┐
//! │ Content store │──▶│   Entities   │──▶│   Pages    │
//! │ (delivery API)│   │ links+decode │   │ Tera + SEO │
//! └───────────────┘   └──────────────┘   └─────┬──────┘
//!                                              │
//!                          ┌───────────────────┤
//!                          ▼                   ▼
//!                     ┌──────────┐       ┌──────────┐
//!                     │   CLI    │       │   HTTP   │
//!                     │ (press)  │       │  (site)  │
//!                     └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! press status                  # verify store credentials
//! press search "deployment"     # search from the terminal
//! press get my-first-post       # read one publication
//! press tags                    # tag vocabulary with usage counts
//! press serve                   # start the site
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Typed content store errors |
//! | [`models`] | Entities and the rich document tree |
//! | [`store`] | Content store HTTP client and link resolution |
//! | [`query`] | Query construction for the entries endpoint |
//! | [`publications`] | Publication retrieval operations |
//! | [`categories`] | Category retrieval operations |
//! | [`tags`] | Tag vocabulary and frequency ranking |
//! | [`richtext`] | Rich document to HTML and plain text |
//! | [`seo`] | Page metadata, canonical URLs, JSON-LD |
//! | [`sitemap`] | Sitemap and robots.txt generation |
//! | [`pages`] | Tera templates and view models |
//! | [`server`] | Site and API HTTP server |
//! | [`webhooks`] | Automation service proxies |
//! | [`commands`] | Terminal commands behind the binary |

pub mod categories;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod pages;
pub mod publications;
pub mod query;
pub mod richtext;
pub mod seo;
pub mod server;
pub mod sitemap;
pub mod store;
pub mod tags;
pub mod webhooks;
