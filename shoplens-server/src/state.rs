//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use shoplens_core::SearchPipeline;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Search pipeline, including the catalog store handle
    pub pipeline: SearchPipeline,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
}

impl AppState {
    pub fn new(pipeline: SearchPipeline, max_file_size: usize) -> Self {
        Self {
            pipeline,
            max_file_size,
        }
    }
}
