//! Health check handlers
//!
//! Provides health and readiness endpoints for monitoring and orchestration.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status: "healthy" or "degraded"
    #[schema(example = "healthy")]
    pub status: &'static str,
    /// Server version from Cargo.toml
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// Service name
    #[schema(example = "shoplens-server")]
    pub service: &'static str,
    /// Whether the product catalog answered its health check
    pub catalog: bool,
}

/// Service health
///
/// Returns service status, version, and catalog availability. The status is
/// `degraded` when the catalog cannot be reached.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let catalog = match state.pipeline.catalog().check_health().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Catalog health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if catalog { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        service: "shoplens-server",
        catalog,
    })
}

/// Readiness response for Kubernetes
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Whether the service is ready to accept traffic
    pub ready: bool,
    /// Optional message explaining status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Readiness probe
///
/// Unlike /health, this is a simple yes/no check.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses((status = 200, description = "Service is ready", body = ReadyResponse))
)]
pub async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse {
        ready: true,
        message: None,
    })
}

/// GET / - plain-text banner
pub async fn root() -> &'static str {
    "ShopLens visual search API is running"
}
