//! Catalog store selection
//!
//! Uses PostgreSQL when `DATABASE_URL` is set, otherwise falls back to an
//! empty in-memory catalog (useful for development, but nothing persists).

mod postgres;

pub use postgres::PostgresCatalogStore;

use std::sync::Arc;

use shoplens_core::{CatalogError, CatalogStore, MemoryCatalog};

use crate::config::Config;

/// Build the catalog store described by `config`.
pub async fn connect_catalog(config: &Config) -> Result<Arc<dyn CatalogStore>, CatalogError> {
    match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!("Using PostgreSQL catalog store");
            let store = PostgresCatalogStore::connect(
                url,
                config.database_max_connections,
                config.database_min_connections,
            )
            .await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using empty in-memory catalog");
            Ok(Arc::new(MemoryCatalog::new()))
        }
    }
}
