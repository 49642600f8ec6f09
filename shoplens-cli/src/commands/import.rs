//! Import command implementation.
//!
//! Loads product metadata from a JSON array and upserts every record into
//! the catalog. A failing record is reported and skipped.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Deserialize;
use shoplens_core::{CatalogEntry, CatalogStore};
use shoplens_server::Config;
use tracing::{info, warn};

use crate::utils::open_catalog;

/// One record of a product metadata file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    #[serde(default, alias = "_id")]
    id: Option<String>,
    title: String,
    image: String,
    price: String,
    link: String,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    feature_vector: Vec<f64>,
}

impl From<ProductRecord> for CatalogEntry {
    fn from(record: ProductRecord) -> Self {
        Self {
            id: record
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            title: record.title,
            image: record.image,
            price: record.price,
            link: record.link,
            style: record.style,
            feature_vector: record.feature_vector,
        }
    }
}

/// Parse a metadata file's contents into catalog entries.
fn parse_records(json: &str) -> Result<Vec<CatalogEntry>> {
    let records: Vec<ProductRecord> =
        serde_json::from_str(json).context("Invalid product metadata")?;
    Ok(records.into_iter().map(Into::into).collect())
}

fn read_records(file: &Path) -> Result<Vec<CatalogEntry>> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read metadata file: {}", file.display()))?;
    parse_records(&json)
}

/// Execute the import command.
pub async fn execute(file: PathBuf) -> Result<()> {
    let entries = read_records(&file)?;
    info!(path = %file.display(), records = entries.len(), "Read product metadata");

    let config = Config::from_env();
    let catalog = open_catalog(&config).await?;

    let mut failed = 0usize;
    for entry in &entries {
        match catalog.insert(entry).await {
            Ok(()) => println!("{} {}", "✓".green(), entry.title),
            Err(e) => {
                failed += 1;
                warn!(id = %entry.id, error = %e, "Failed to import product");
                println!("{} {} ({})", "✗".red(), entry.title, e);
            }
        }
    }

    println!();
    println!(
        "{} {} of {} products.",
        "Imported".green().bold(),
        entries.len() - failed,
        entries.len()
    );

    if failed > 0 {
        bail!("Failed to import {} of {} products", failed, entries.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records_assigns_missing_ids() {
        let entries = parse_records(
            r#"[
                {"title": "Linen Shirt", "image": "shirt.jpg", "price": "₹1,299",
                 "link": "https://shop.example.com/shirt", "style": "minimalist"},
                {"_id": "tote-1", "title": "Tote", "image": "tote.jpg", "price": "₹799",
                 "link": "https://shop.example.com/tote", "featureVector": [0.5, 0.25]}
            ]"#,
        )
        .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id.len(), 36);
        assert_eq!(entries[0].style.as_deref(), Some("minimalist"));
        assert!(entries[0].feature_vector.is_empty());
        assert_eq!(entries[1].id, "tote-1");
        assert_eq!(entries[1].style, None);
        assert_eq!(entries[1].feature_vector, vec![0.5, 0.25]);
    }

    #[test]
    fn test_blank_id_is_replaced() {
        let entries = parse_records(
            r#"[{"id": " ", "title": "t", "image": "i.jpg", "price": "1", "link": "l"}]"#,
        )
        .unwrap();
        assert_ne!(entries[0].id.trim(), "");
    }

    #[test]
    fn test_parse_records_rejects_missing_fields() {
        assert!(parse_records(r#"[{"title": "No image"}]"#).is_err());
        assert!(parse_records(r#"{"title": "not an array"}"#).is_err());
    }

    #[test]
    fn test_read_records_missing_file() {
        let err = read_records(Path::new("/nonexistent/products.json")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read"));
    }
}
