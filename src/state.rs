//! Shared application state

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::pipeline::UploadPipeline;

/// State shared by all route handlers.
///
/// The pipeline carries the one extractor configured at startup; handlers
/// never consult configuration to pick a backend per call.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub pipeline: Arc<UploadPipeline>,
}

impl AppState {
    pub fn new(pool: SqlitePool, pipeline: Arc<UploadPipeline>) -> Self {
        Self { pool, pipeline }
    }
}
