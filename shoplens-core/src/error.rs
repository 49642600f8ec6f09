use std::time::Duration;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::engine::EngineError;
use crate::intake::IntakeError;

/// Request-scoped failures of the search pipeline.
///
/// Every variant is recovered at the pipeline boundary; none of them aborts
/// the host process or touches other in-flight searches.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("No file provided")]
    NoFileProvided,

    #[error("Similarity engine produced no output")]
    EngineProducedNoOutput,

    #[error("Similarity engine output malformed: {0}")]
    EngineOutputMalformed(String),

    #[error("Similarity engine timed out after {0:?}")]
    EngineTimeout(Duration),

    #[error("Similarity engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<EngineError> for SearchError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NoOutput => Self::EngineProducedNoOutput,
            EngineError::Malformed(reason) => Self::EngineOutputMalformed(reason),
            EngineError::Timeout(after) => Self::EngineTimeout(after),
            EngineError::Spawn(reason) => Self::EngineUnavailable(reason),
            EngineError::Io(e) => Self::EngineUnavailable(e.to_string()),
        }
    }
}

impl From<CatalogError> for SearchError {
    fn from(err: CatalogError) -> Self {
        Self::CatalogUnavailable(err.to_string())
    }
}

impl From<IntakeError> for SearchError {
    fn from(err: IntakeError) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_map_to_taxonomy() {
        assert!(matches!(
            SearchError::from(EngineError::NoOutput),
            SearchError::EngineProducedNoOutput
        ));
        assert!(matches!(
            SearchError::from(EngineError::Malformed("x".into())),
            SearchError::EngineOutputMalformed(_)
        ));
        assert!(matches!(
            SearchError::from(EngineError::Timeout(Duration::from_secs(1))),
            SearchError::EngineTimeout(d) if d == Duration::from_secs(1)
        ));
        assert!(matches!(
            SearchError::from(EngineError::Spawn("missing".into())),
            SearchError::EngineUnavailable(_)
        ));
    }

    #[test]
    fn test_catalog_error_is_unavailable() {
        let err = SearchError::from(CatalogError::Connection("refused".into()));
        assert!(matches!(err, SearchError::CatalogUnavailable(ref m) if m.contains("refused")));
    }
}
