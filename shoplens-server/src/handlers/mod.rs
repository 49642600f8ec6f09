//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod health;
pub mod products;
pub mod search;

pub use crate::state::AppState;
pub use health::{health, ready, root, HealthResponse, ReadyResponse};
pub use products::list_products;
pub use search::upload_image_handler;
