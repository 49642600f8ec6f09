//! Result assembly.
//!
//! Pure transformation from a stored query image and its filtered matches
//! into the response returned to clients.

use serde::Serialize;

use crate::catalog::CatalogEntry;
use crate::intake::UploadedImage;

/// A matched catalog entry as returned to clients.
///
/// `image_url` is the public URL of the *query* image, repeated on every
/// item for compatibility with existing clients. The product's own picture
/// stays in `image`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MatchedProduct {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    /// Public URL of the uploaded query image
    #[cfg_attr(
        feature = "openapi",
        schema(example = "http://localhost:3000/uploads/1718000000000.jpg")
    )]
    pub image_url: String,
}

/// Response of a visual search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Filename supplied by the client
    #[cfg_attr(feature = "openapi", schema(example = "IMG_2041.jpg"))]
    pub uploaded: String,
    /// Public URL of the uploaded query image
    #[cfg_attr(
        feature = "openapi",
        schema(example = "http://localhost:3000/uploads/1718000000000.jpg")
    )]
    pub image_url: String,
    /// Matches sharing the consensus style; empty when nothing matched
    pub similar_products: Vec<MatchedProduct>,
}

/// Build the response for `image` from its style-filtered matches.
///
/// Never fails and performs no I/O; an empty match list is a valid outcome.
pub fn assemble(image: &UploadedImage, filtered: Vec<CatalogEntry>) -> SearchResponse {
    let image_url = image.public_url.to_string();

    let similar_products = filtered
        .into_iter()
        .map(|entry| MatchedProduct {
            entry,
            image_url: image_url.clone(),
        })
        .collect();

    SearchResponse {
        uploaded: image.original_name.clone(),
        image_url,
        similar_products,
    }
}
