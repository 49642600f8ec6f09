//! Products command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use shoplens_core::CatalogStore;
use shoplens_server::Config;

use crate::utils::{open_catalog, print_entry, print_json};

/// Execute the products command.
pub async fn execute(json: bool) -> Result<()> {
    let config = Config::from_env();
    let catalog = open_catalog(&config).await?;

    let products = catalog
        .find_all()
        .await
        .context("Failed to list products")?;

    if json {
        return print_json(&products);
    }

    if products.is_empty() {
        println!("{}", "The catalog is empty.".yellow());
        return Ok(());
    }

    for (i, entry) in products.iter().enumerate() {
        print_entry(i + 1, entry);
    }
    println!();
    println!("{} products", products.len().to_string().bold());

    Ok(())
}
