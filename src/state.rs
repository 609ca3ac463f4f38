//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::ocr::TextExtractor;
use crate::pipeline::IngestionPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pub config: Config,
    pub db: SqlitePool,
    pub pipeline: IngestionPipeline,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    /// Create a new application state
    pub fn new(
        config: Config,
        db: SqlitePool,
        extractor: TextExtractor,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let pipeline = IngestionPipeline::new(extractor, db.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                pipeline,
                authenticator,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the ingestion pipeline
    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.inner.pipeline
    }

    /// Get the admin authenticator
    pub fn authenticator(&self) -> &dyn Authenticator {
        self.inner.authenticator.as_ref()
    }
}
