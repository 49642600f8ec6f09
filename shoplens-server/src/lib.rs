//! ShopLens Server Library - REST API components for visual product search
//!
//! This library exposes the server components for use in integration tests
//! and by the CLI. The main binary uses these same components.

pub mod catalog_store;
pub mod config;
pub mod error;
pub mod handlers;
pub mod multipart;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod validation;

pub use catalog_store::{connect_catalog, PostgresCatalogStore};
pub use config::Config;
pub use error::ApiError;
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
