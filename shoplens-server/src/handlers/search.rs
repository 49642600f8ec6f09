//! Visual search handler
//!
//! Handles POST /upload-image requests.

use axum::{
    extract::{Multipart, State},
    Json,
};
use shoplens_core::SearchResponse;

use crate::error::ApiError;
use crate::multipart::UploadForm;
use crate::state::AppState;

/// Find catalog products that look like an uploaded photo
///
/// Accepts multipart/form-data with:
/// - **file** (required): the query image
///
/// The image is stored under a generated name, ranked against the catalog by
/// the similarity engine, and the matches are narrowed to the style of the
/// best resolved match. An empty `similarProducts` list is a valid result.
#[utoipa::path(
    post,
    path = "/upload-image",
    tag = "Search",
    request_body(
        content_type = "multipart/form-data",
        description = "Query image in the `file` field"
    ),
    responses(
        (status = 200, description = "Search completed", body = SearchResponse),
        (status = 400, description = "No file uploaded or unsupported content type"),
        (status = 413, description = "File too large"),
        (status = 500, description = "Engine, catalog, or storage failure")
    )
)]
pub async fn upload_image_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SearchResponse>, ApiError> {
    let form = UploadForm::parse(&mut multipart, state.max_file_size).await?;

    let response = state.pipeline.search(form.into_upload()).await?;

    Ok(Json(response))
}
