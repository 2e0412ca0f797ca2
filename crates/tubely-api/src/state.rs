//! Application state shared by all handlers.

use crate::services::ingest::VideoIngestService;
use std::sync::Arc;
use tubely_db::VideoRepository;
use tubely_storage::{AccessUrlIssuer, LocalStorage};

/// Intake limits applied before any staging work.
#[derive(Clone, Debug)]
pub struct UploadLimits {
    pub max_upload_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoRepository>,
    pub ingest: Arc<VideoIngestService>,
    pub urls: AccessUrlIssuer,
    /// Set only when the local filesystem backend is configured.
    pub local_storage: Option<Arc<LocalStorage>>,
    pub upload: UploadLimits,
    pub security: SecurityConfig,
}
