//! Clear command implementation.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use shoplens_core::CatalogStore;
use shoplens_server::Config;
use tracing::warn;

use crate::utils::open_catalog;

/// Execute the clear command.
pub async fn execute(yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to clear the catalog without --yes");
    }

    let config = Config::from_env();
    let catalog = open_catalog(&config).await?;

    let deleted = catalog.clear().await.context("Failed to clear catalog")?;
    warn!(deleted, "Catalog cleared");

    println!(
        "{} {} products from the catalog.",
        "Deleted".green().bold(),
        deleted
    );

    Ok(())
}
