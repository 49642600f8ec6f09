//! Catalog listing handler

use axum::{extract::State, Json};
use shoplens_core::CatalogEntry;

use crate::error::ApiError;
use crate::state::AppState;

/// List every product in the catalog
#[utoipa::path(
    get,
    path = "/products",
    tag = "Catalog",
    responses(
        (status = 200, description = "All catalog entries", body = Vec<CatalogEntry>),
        (status = 500, description = "Catalog unavailable")
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    let products = state.pipeline.catalog().find_all().await?;

    tracing::debug!(count = products.len(), "Listed catalog");

    Ok(Json(products))
}
