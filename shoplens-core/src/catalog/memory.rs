//! In-memory catalog store.
//!
//! Useful for tests and for running the server without a database. Contents
//! are lost on restart.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{CatalogEntry, CatalogError, CatalogStore, Identifier};

/// Catalog held in process memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    entries: RwLock<Vec<CatalogEntry>>,
    lookups: AtomicUsize,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    ///
    /// Later entries replace earlier ones with the same identifier.
    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.write();
            for entry in entries {
                upsert(&mut guard, entry);
            }
        }
        store
    }

    /// Number of `find_by_ids` calls served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<CatalogEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<CatalogEntry>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn upsert(entries: &mut Vec<CatalogEntry>, entry: CatalogEntry) {
    match entries.iter_mut().find(|existing| existing.id == entry.id) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn find_by_ids(&self, ids: &[Identifier]) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .read()
            .iter()
            .filter(|entry| ids.contains(&entry.id))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(self.read().clone())
    }

    async fn insert(&self, entry: &CatalogEntry) -> Result<(), CatalogError> {
        upsert(&mut self.write(), entry.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<u64, CatalogError> {
        let mut guard = self.write();
        let removed = guard.len() as u64;
        guard.clear();
        Ok(removed)
    }

    async fn check_health(&self) -> Result<(), CatalogError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::entry;

    #[tokio::test]
    async fn test_insert_replaces_same_id() {
        let store = MemoryCatalog::new();
        store.insert(&entry("a", Some("old"))).await.unwrap();
        store.insert(&entry("a", Some("new"))).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].style.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_find_by_ids_preserves_store_order() {
        let store = MemoryCatalog::with_entries(vec![
            entry("a", None),
            entry("b", None),
            entry("c", None),
        ]);
        let ids = vec!["c".to_string(), "a".to_string()];

        let found = store.find_by_ids(&ids).await.unwrap();
        let order: Vec<_> = found.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_clear_reports_count() {
        let store = MemoryCatalog::with_entries(vec![entry("a", None), entry("b", None)]);
        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.find_all().await.unwrap().is_empty());
        assert_eq!(store.clear().await.unwrap(), 0);
    }
}
