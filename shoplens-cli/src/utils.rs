//! Common helpers shared across CLI commands.

use anyhow::{Context, Result};
use colored::Colorize;
use shoplens_core::CatalogEntry;
use shoplens_server::{Config, PostgresCatalogStore};
use tracing::debug;

/// Connect to the PostgreSQL catalog named by `DATABASE_URL`.
pub async fn open_catalog(config: &Config) -> Result<PostgresCatalogStore> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not set; the catalog lives in PostgreSQL")?;

    debug!("Connecting to catalog");
    let store = PostgresCatalogStore::connect(
        url,
        config.database_max_connections,
        config.database_min_connections,
    )
    .await
    .context("Failed to connect to catalog")?;

    Ok(store)
}

/// Print one catalog entry as a short human-readable block.
pub fn print_entry(rank: usize, entry: &CatalogEntry) {
    println!(
        "{:>3}. {} {}",
        rank,
        entry.title.bold(),
        format!("[{}]", entry.id).dimmed()
    );
    println!("     {} {}", "Price:".dimmed(), entry.price);
    println!(
        "     {} {}",
        "Style:".dimmed(),
        entry.style_label().unwrap_or("-")
    );
    println!("     {} {}", "Image:".dimmed(), entry.image);
    println!("     {} {}", "Link:".dimmed(), entry.link.cyan());
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
