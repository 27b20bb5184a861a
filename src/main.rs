//! # Pressroom CLI (`press`)
//!
//! The `press` binary drives the publishing site. It starts the HTTP server
//! and provides terminal commands for searching the content store, reading a
//! publication, and reporting on tags and configuration.
//!
//! ## Usage
//!
//! ```bash
//! press --config ./pressroom.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `press serve` | Start the site and API server |
//! | `press search "<query>"` | Search publications from the terminal |
//! | `press get <slug>` | Print one publication as text |
//! | `press tags` | Print the tag vocabulary with usage counts |
//! | `press status` | Check configuration and store reachability |
//!
//! ## Examples
//!
//! ```bash
//! # Start the server
//! press serve --config ./pressroom.toml
//!
//! # Search published entries
//! press search "release notes"
//!
//! # Search drafts through the preview API
//! press search "release notes" --preview
//!
//! # Read an article in the terminal
//! press get shipping-a-headless-frontend
//!
//! # Verify credentials before deploying
//! press status
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pressroom::{commands, config, server};

/// Pressroom CLI: a server-rendered publishing site over a headless
/// content store.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `pressroom.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "press",
    about = "Pressroom, a server-rendered publishing site over a headless content store",
    version,
    long_about = "Pressroom reads publications and categories from a Contentful-compatible \
    delivery API, renders them as a complete site with SEO metadata, JSON-LD, a sitemap, and \
    a robots policy, and proxies reader submissions to an external automation service."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./pressroom.toml`. Store credentials, site identity,
    /// server, and webhook settings are read from this file. Credentials may
    /// also come from `PRESSROOM_SPACE_ID` and `PRESSROOM_ACCESS_TOKEN`.
    #[arg(long, global = true, default_value = "./pressroom.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the site and API server.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// rendered pages, the JSON API, the sitemap, and robots.txt.
    Serve,

    /// Search publications from the terminal.
    ///
    /// Runs the same full-text search the site uses and prints ranked
    /// matches with their slugs, categories, and tags.
    Search {
        /// The search query string.
        query: String,

        /// Read through the preview API (includes unpublished drafts).
        #[arg(long)]
        preview: bool,
    },

    /// Print one publication as text.
    ///
    /// Looks the publication up by slug and prints its metadata and body
    /// with the rich-text markup flattened.
    Get {
        /// Publication slug.
        slug: String,

        /// Read through the preview API (includes unpublished drafts).
        #[arg(long)]
        preview: bool,
    },

    /// Print the tag vocabulary with usage counts.
    ///
    /// Scans the publication corpus (up to `[store].max_scan_limit`
    /// entries) and aggregates tags client-side, most used first.
    Tags,

    /// Check configuration and store reachability.
    ///
    /// Prints the configured site identity and credential status, then
    /// probes the store with a one-entry query.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pressroom=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Search { query, preview } => {
            commands::run_search(&cfg, &query, preview).await?;
        }
        Commands::Get { slug, preview } => {
            commands::run_get(&cfg, &slug, preview).await?;
        }
        Commands::Tags => {
            commands::run_tags(&cfg).await?;
        }
        Commands::Status => {
            commands::run_status(&cfg).await?;
        }
    }

    Ok(())
}
