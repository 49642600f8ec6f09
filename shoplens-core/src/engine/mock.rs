//! Mock similarity engine for testing.
//!
//! Never spawns anything. Returns a canned response and records the paths
//! it was asked about.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{EngineError, SimilarityEngine};
use crate::catalog::Identifier;

/// What a [`MockEngine`] answers with.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Ids(Vec<Identifier>),
    NoOutput,
    Malformed(String),
    Timeout(Duration),
    Unavailable(String),
}

/// Engine with a fixed answer, for exercising the pipeline without a process.
#[derive(Debug)]
pub struct MockEngine {
    response: MockResponse,
    calls: Mutex<Vec<PathBuf>>,
}

impl MockEngine {
    pub fn new(response: MockResponse) -> Self {
        Self {
            response,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Engine that always ranks `ids` in the given order.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Identifier>,
    {
        Self::new(MockResponse::Ids(ids.into_iter().map(Into::into).collect()))
    }

    /// Paths passed to `find_similar`, oldest first.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl SimilarityEngine for MockEngine {
    async fn find_similar(&self, image_path: &Path) -> Result<Vec<Identifier>, EngineError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(image_path.to_path_buf());

        match &self.response {
            MockResponse::Ids(ids) => Ok(ids.clone()),
            MockResponse::NoOutput => Err(EngineError::NoOutput),
            MockResponse::Malformed(reason) => Err(EngineError::Malformed(reason.clone())),
            MockResponse::Timeout(after) => Err(EngineError::Timeout(*after)),
            MockResponse::Unavailable(reason) => Err(EngineError::Spawn(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let engine = MockEngine::with_ids(["a", "b"]);
        let ids = engine.find_similar(Path::new("/uploads/1.jpg")).await.unwrap();

        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(engine.calls(), vec![PathBuf::from("/uploads/1.jpg")]);
    }

    #[tokio::test]
    async fn test_mock_failure_modes() {
        let engine = MockEngine::new(MockResponse::NoOutput);
        assert!(matches!(
            engine.find_similar(Path::new("x")).await,
            Err(EngineError::NoOutput)
        ));

        let engine = MockEngine::new(MockResponse::Timeout(Duration::from_secs(2)));
        assert!(matches!(
            engine.find_similar(Path::new("x")).await,
            Err(EngineError::Timeout(_))
        ));
    }
}
