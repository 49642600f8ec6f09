//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error variants.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shoplens_core::{CatalogError, SearchError};
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Payload too large - upload exceeds the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Catalog lookup failed outside of a search
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Search pipeline error
    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a payload too large error
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::PayloadTooLarge(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Search(ref e) => match e {
                SearchError::NoFileProvided => StatusCode::BAD_REQUEST,
                SearchError::EngineProducedNoOutput
                | SearchError::EngineOutputMalformed(_)
                | SearchError::EngineTimeout(_)
                | SearchError::EngineUnavailable(_)
                | SearchError::CatalogUnavailable(_)
                | SearchError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::PayloadTooLarge(_) => "FILE_TOO_LARGE",
            Self::Catalog(_) => "CATALOG_UNAVAILABLE",
            Self::Search(ref e) => match e {
                SearchError::NoFileProvided => "NO_FILE_PROVIDED",
                SearchError::EngineProducedNoOutput => "ENGINE_NO_OUTPUT",
                SearchError::EngineOutputMalformed(_) => "ENGINE_OUTPUT_MALFORMED",
                SearchError::EngineTimeout(_) => "ENGINE_TIMEOUT",
                SearchError::EngineUnavailable(_) => "ENGINE_UNAVAILABLE",
                SearchError::CatalogUnavailable(_) => "CATALOG_UNAVAILABLE",
                SearchError::Storage(_) => "STORAGE_ERROR",
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            // Engine stderr and SQL messages stay in the logs
            Self::Catalog(_) => "Product catalog unavailable".to_string(),
            Self::Search(ref e) => match e {
                SearchError::NoFileProvided => "No file uploaded".to_string(),
                SearchError::EngineProducedNoOutput => {
                    "No output from similarity engine".to_string()
                }
                SearchError::EngineOutputMalformed(_) => {
                    "Similarity engine returned an invalid response".to_string()
                }
                SearchError::EngineTimeout(_) => "Similarity search timed out".to_string(),
                SearchError::EngineUnavailable(_) => {
                    "Similarity engine unavailable".to_string()
                }
                SearchError::CatalogUnavailable(_) => "Product catalog unavailable".to_string(),
                SearchError::Storage(_) => "Failed to store uploaded image".to_string(),
            },
            // For other errors, use the Display message
            _ => self.to_string(),
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Catalog(_) => "catalog",
            Self::Search(SearchError::NoFileProvided) => "bad_request",
            Self::Search(
                SearchError::EngineProducedNoOutput
                | SearchError::EngineOutputMalformed(_)
                | SearchError::EngineTimeout(_)
                | SearchError::EngineUnavailable(_),
            ) => "engine",
            Self::Search(SearchError::CatalogUnavailable(_)) => "catalog",
            Self::Search(SearchError::Storage(_)) => "storage",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        // Log based on severity, always including internal details
        if status.is_client_error() {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Client error"
            );
        } else {
            tracing::error!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                client_message = %client_message,
                "Server error"
            );
        }

        // All error responses include a `code` field for programmatic error handling
        let body = serde_json::json!({
            "error": client_message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
