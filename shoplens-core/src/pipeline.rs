//! Visual search orchestration.
//!
//! Runs the stages of one search strictly in sequence:
//! intake → engine → catalog resolve → style consensus → assemble.
//!
//! A failure in intake or the engine short-circuits the rest. Dropping the
//! returned future (for example when the client disconnects) drops the engine
//! call with it, which kills the engine process.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::assemble::{assemble, SearchResponse};
use crate::catalog::{resolve, CatalogEntry, CatalogStore};
use crate::engine::SimilarityEngine;
use crate::error::{Result, SearchError};
use crate::intake::{ImageUpload, LocalImageStore};
use crate::style::{consensus_style, filter_by_consensus_style, StylePolicy};

/// Search pipeline wired to its collaborators.
///
/// Cheap to clone; clones share the engine and catalog handles.
#[derive(Clone)]
pub struct SearchPipeline {
    intake: LocalImageStore,
    engine: Arc<dyn SimilarityEngine>,
    catalog: Arc<dyn CatalogStore>,
    style_policy: StylePolicy,
}

impl SearchPipeline {
    pub fn new(
        intake: LocalImageStore,
        engine: Arc<dyn SimilarityEngine>,
        catalog: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            intake,
            engine,
            catalog,
            style_policy: StylePolicy::default(),
        }
    }

    pub fn with_style_policy(mut self, policy: StylePolicy) -> Self {
        self.style_policy = policy;
        self
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        &self.catalog
    }

    /// Run a full search for `upload`.
    ///
    /// `None` means the request carried no file at all, which is distinct
    /// from an empty file.
    #[instrument(skip_all, fields(stored_name = tracing::field::Empty))]
    pub async fn search(&self, upload: Option<ImageUpload>) -> Result<SearchResponse> {
        let upload = upload.ok_or(SearchError::NoFileProvided)?;

        let image = self.intake.store(upload).await?;
        tracing::Span::current().record("stored_name", image.stored_name.as_str());

        let matches = self.match_image(&image.path).await?;

        Ok(assemble(&image, matches))
    }

    /// Match an image that is already on disk, skipping intake.
    ///
    /// Returns the catalog entries sharing the consensus style, best match
    /// first.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn match_image(&self, path: &Path) -> Result<Vec<CatalogEntry>> {
        let ranked = self.engine.find_similar(path).await?;

        let resolved = resolve(self.catalog.as_ref(), &ranked).await?;
        if resolved.is_empty() {
            info!(ranked = ranked.len(), "No products matched the engine identifiers");
            return Ok(Vec::new());
        }

        info!(
            style = consensus_style(&resolved, &ranked).unwrap_or("<none>"),
            "Extracted consensus style"
        );

        let filtered = filter_by_consensus_style(resolved, &ranked, self.style_policy);

        info!(
            ranked = ranked.len(),
            matched = filtered.len(),
            "Search completed"
        );

        Ok(filtered)
    }
}
