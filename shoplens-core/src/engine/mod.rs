//! Similarity engine gateway.
//!
//! The engine is an opaque capability: given the path of a stored query
//! image it returns catalog identifiers ranked best match first. No scores
//! cross this boundary.
//!
//! - [`ProcessEngine`] - runs an external program per request
//! - [`MockEngine`] - canned responses for tests

mod mock;
mod process;

pub use mock::{MockEngine, MockResponse};
pub use process::{ProcessEngine, ProcessEngineConfig, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT};

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::Identifier;

/// Failures of a single engine invocation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine exited without writing a single byte to stdout.
    #[error("Engine produced no output")]
    NoOutput,

    /// Output was not a JSON array of strings, exceeded the buffer limit, or
    /// the engine exited abnormally after writing something.
    #[error("Engine output malformed: {0}")]
    Malformed(String),

    /// The engine did not finish in time and was killed.
    #[error("Engine timed out after {0:?}")]
    Timeout(Duration),

    /// The engine program could not be started.
    #[error("Failed to spawn engine: {0}")]
    Spawn(String),

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability that maps a query image to ranked catalog identifiers.
///
/// Implementations must be thread-safe (`Send + Sync`). Each call is
/// independent; no state may leak from one request into another.
#[async_trait]
pub trait SimilarityEngine: Send + Sync {
    /// Rank catalog identifiers by visual similarity to the image at `image_path`.
    ///
    /// Index 0 is the best match.
    async fn find_similar(&self, image_path: &Path) -> Result<Vec<Identifier>, EngineError>;
}

/// Parse engine stdout as a single JSON array of identifier strings.
pub fn parse_identifiers(output: &[u8]) -> Result<Vec<Identifier>, EngineError> {
    if output.is_empty() {
        return Err(EngineError::NoOutput);
    }

    serde_json::from_slice::<Vec<Identifier>>(output)
        .map_err(|e| EngineError::Malformed(format!("expected a JSON array of strings: {e}")))
}
