//! Product catalog access.
//!
//! The catalog itself lives in an external store. This module only
//! defines the record type, the query contract the pipeline consumes
//! ([`CatalogStore`]) and the batched resolver built on top of it.
//!
//! - [`MemoryCatalog`] - in-process store for tests and local development
//! - `PostgresCatalogStore` (server crate) - production backend

mod memory;

pub use memory::MemoryCatalog;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Opaque, globally unique key of one catalog record.
pub type Identifier = String;

/// Errors raised by a catalog backend.
///
/// Only connectivity and query faults exist here: a missing identifier is
/// not an error, it is simply absent from the result.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog connection error: {0}")]
    Connection(String),

    #[error("Catalog migration error: {0}")]
    Migration(String),

    #[error("Catalog query error: {0}")]
    Query(String),
}

/// A product record as stored in the catalog.
///
/// Field names on the wire follow the document store layout (`_id`,
/// `featureVector`), so listings stay compatible with existing clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Catalog identifier
    #[serde(rename = "_id")]
    #[cfg_attr(feature = "openapi", schema(example = "64f1c2a9e4b0a1d2c3e4f5a6"))]
    pub id: Identifier,
    /// Product title
    #[cfg_attr(feature = "openapi", schema(example = "Leather Chelsea Boot"))]
    pub title: String,
    /// Product image reference (relative path or absolute URL)
    #[cfg_attr(feature = "openapi", schema(example = "boot-01.jpg"))]
    pub image: String,
    /// Display price; not guaranteed to be numeric
    #[cfg_attr(feature = "openapi", schema(example = "₹2,499"))]
    pub price: String,
    /// External purchase link
    pub link: String,
    /// Free-form style classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(example = "casual"))]
    pub style: Option<String>,
    /// Feature vector consumed by the similarity engine only
    #[serde(default)]
    pub feature_vector: Vec<f64>,
}

impl CatalogEntry {
    /// Style label, treating an empty string the same as no label.
    pub fn style_label(&self) -> Option<&str> {
        self.style.as_deref().filter(|s| !s.is_empty())
    }
}

/// Query contract of the catalog store.
///
/// Implementations must be thread-safe; one store handle is shared by every
/// request the hosting service runs.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch every entry whose identifier is in `ids`, in one round trip.
    ///
    /// Unknown identifiers are skipped. No ordering is promised.
    async fn find_by_ids(&self, ids: &[Identifier]) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Fetch the whole catalog.
    async fn find_all(&self) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Insert an entry, replacing any entry with the same identifier.
    async fn insert(&self, entry: &CatalogEntry) -> Result<(), CatalogError>;

    /// Delete every entry and return how many were removed.
    async fn clear(&self) -> Result<u64, CatalogError>;

    /// Cheap liveness probe used by health checks.
    async fn check_health(&self) -> Result<(), CatalogError>;
}

/// Resolve ranked engine identifiers into catalog entries.
///
/// Issues at most one batched lookup. An empty identifier list short-circuits
/// without touching the store.
pub async fn resolve(
    store: &dyn CatalogStore,
    ids: &[Identifier],
) -> Result<Vec<CatalogEntry>, CatalogError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let entries = store.find_by_ids(ids).await?;

    debug!(
        requested = ids.len(),
        resolved = entries.len(),
        "Resolved identifiers against catalog"
    );

    Ok(entries)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn entry(id: &str, style: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            title: format!("Product {id}"),
            image: format!("{id}.jpg"),
            price: "₹999".to_string(),
            link: format!("https://shop.example.com/p/{id}"),
            style: style.map(str::to_string),
            feature_vector: vec![0.1, 0.2],
        }
    }

    #[test]
    fn test_style_label_treats_empty_as_absent() {
        assert_eq!(entry("a", Some("boho")).style_label(), Some("boho"));
        assert_eq!(entry("a", Some("")).style_label(), None);
        assert_eq!(entry("a", None).style_label(), None);
    }

    #[test]
    fn test_entry_wire_format() {
        let json = serde_json::to_value(entry("abc", Some("formal"))).unwrap();
        assert_eq!(json["_id"], "abc");
        assert_eq!(json["style"], "formal");
        assert!(json["featureVector"].is_array());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_entry_without_style_deserializes() {
        let json = r#"{"_id":"1","title":"T","image":"i.jpg","price":"10","link":"l"}"#;
        let parsed: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.style, None);
        assert!(parsed.feature_vector.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_drops_missing_ids() {
        let store = MemoryCatalog::with_entries(vec![entry("a", None), entry("c", None)]);
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let resolved = resolve(&store, &ids).await.unwrap();

        let mut found: Vec<_> = resolved.iter().map(|e| e.id.as_str()).collect();
        found.sort();
        assert_eq!(found, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_resolve_empty_is_not_an_error() {
        let store = MemoryCatalog::new();
        let resolved = resolve(&store, &["zzz".to_string()]).await.unwrap();
        assert!(resolved.is_empty());

        let resolved = resolve(&store, &[]).await.unwrap();
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_uses_single_batched_lookup() {
        let store = MemoryCatalog::with_entries(vec![entry("a", None), entry("b", None)]);
        let ids = vec!["a".to_string(), "b".to_string(), "q".to_string()];

        resolve(&store, &ids).await.unwrap();

        assert_eq!(store.lookup_count(), 1);
    }
}
