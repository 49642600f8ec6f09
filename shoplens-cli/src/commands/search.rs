//! Search command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use shoplens_core::{LocalImageStore, ProcessEngine, SearchPipeline};
use shoplens_server::Config;
use tracing::debug;

use crate::utils::{open_catalog, print_entry, print_json};

/// Execute the search command.
///
/// Runs the engine directly on the local file; nothing is copied into the
/// upload directory.
pub async fn execute(image: PathBuf, json: bool) -> Result<()> {
    let path = tokio::fs::canonicalize(&image)
        .await
        .with_context(|| format!("Failed to read image: {}", image.display()))?;
    let metadata = tokio::fs::metadata(&path)
        .await
        .with_context(|| format!("Failed to read image: {}", image.display()))?;
    if !metadata.is_file() {
        bail!("Failed to read image: {} is not a file", image.display());
    }

    let config = Config::from_env();
    let catalog = open_catalog(&config).await?;
    let intake = LocalImageStore::new(
        &config.upload_dir,
        config.uploads_base_url().context("Invalid PUBLIC_BASE_URL")?,
    )
    .context("Invalid UPLOAD_DIR")?;
    let pipeline = SearchPipeline::new(
        intake,
        Arc::new(ProcessEngine::new(config.engine_config())),
        Arc::new(catalog),
    )
    .with_style_policy(config.style_policy());

    let start = Instant::now();
    let matches = pipeline
        .match_image(&path)
        .await
        .context("Similarity search failed")?;
    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Search finished");

    // Every match shares the consensus style, so the first one names it
    let style = matches.first().and_then(|e| e.style_label()).map(str::to_string);

    if json {
        return print_json(&matches);
    }

    if matches.is_empty() {
        println!("{}", "No similar products found.".yellow());
        return Ok(());
    }

    println!();
    println!(
        "{} {} {}",
        "Found".green().bold(),
        matches.len().to_string().green().bold(),
        match style.as_deref() {
            Some(style) => format!("products in style \"{}\"", style),
            None => "products".to_string(),
        }
    );
    println!();
    for (i, entry) in matches.iter().enumerate() {
        print_entry(i + 1, entry);
    }

    Ok(())
}
