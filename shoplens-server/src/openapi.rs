//! OpenAPI documentation configuration

use shoplens_core::{CatalogEntry, MatchedProduct, SearchResponse};
use utoipa::OpenApi;

use crate::handlers::{HealthResponse, ReadyResponse};

/// ShopLens visual search API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ShopLens - Visual Search API",
        version = "0.1.0",
        description = r#"
## Visual product search

Upload a photo of a product and get back catalog items that look like it
and share one style.

1. `POST /upload-image` with the photo in the `file` field
2. The image is stored and served back under `/uploads`
3. A similarity engine ranks catalog identifiers best match first
4. Ranked products are fetched and narrowed to the style of the best match

Catalog images are served under `/products/{file}`.
"#,
        license(name = "MIT OR Apache-2.0"),
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Search", description = "Find visually similar products"),
        (name = "Catalog", description = "Product catalog"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::search::upload_image_handler,
        crate::handlers::products::list_products,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            SearchResponse,
            MatchedProduct,
            CatalogEntry,
        )
    )
)]
pub struct ApiDoc;
