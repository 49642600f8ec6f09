//! ShopLens Core - visual product search pipeline
//!
//! Takes a photograph of a product and returns catalog entries that look
//! alike and share one style.
//!
//! # Pipeline
//!
//! 1. **Intake** - store the upload under a generated name ([`LocalImageStore`])
//! 2. **Engine** - rank catalog identifiers by similarity ([`SimilarityEngine`])
//! 3. **Resolve** - fetch the ranked entries in one batched lookup ([`CatalogStore`])
//! 4. **Consensus** - keep entries sharing the best match's style ([`StylePolicy`])
//! 5. **Assemble** - build the client response ([`SearchResponse`])
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shoplens_core::{
//!     ImageUpload, LocalImageStore, MemoryCatalog, ProcessEngine, ProcessEngineConfig,
//!     SearchPipeline,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let intake = LocalImageStore::new("uploads", "http://localhost:3000/uploads/".parse()?)?;
//! let engine = Arc::new(ProcessEngine::new(ProcessEngineConfig::default()));
//! let catalog = Arc::new(MemoryCatalog::new());
//!
//! let pipeline = SearchPipeline::new(intake, engine, catalog);
//! let response = pipeline
//!     .search(Some(ImageUpload {
//!         bytes: std::fs::read("shoe.jpg")?,
//!         original_name: "shoe.jpg".into(),
//!         mime_type: Some("image/jpeg".into()),
//!     }))
//!     .await?;
//! println!("{} matches", response.similar_products.len());
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod intake;
pub mod pipeline;
pub mod style;

pub use assemble::{assemble, MatchedProduct, SearchResponse};
pub use catalog::{resolve, CatalogEntry, CatalogError, CatalogStore, Identifier, MemoryCatalog};
pub use engine::{
    parse_identifiers, EngineError, MockEngine, MockResponse, ProcessEngine, ProcessEngineConfig,
    SimilarityEngine,
};
pub use error::{Result, SearchError};
pub use intake::{stored_name, ImageUpload, IntakeError, LocalImageStore, UploadedImage};
pub use pipeline::SearchPipeline;
pub use style::{consensus_style, filter_by_consensus_style, StylePolicy};
