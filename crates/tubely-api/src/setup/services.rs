//! Wiring of repositories, tools and storage into [`AppState`].

use crate::services::ingest::VideoIngestService;
use crate::state::{AppState, SecurityConfig, UploadLimits};
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{PgVideoRepository, VideoRepository};
use tubely_processing::{FfmpegFastStart, FfprobeInspector, ProcessingGate, ToolRunner};
use tubely_storage::{AccessUrlIssuer, ObjectPlacement, StorageHandle};

/// Build the application state from configuration and connected backends.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: StorageHandle,
) -> Result<Arc<AppState>> {
    std::fs::create_dir_all(&config.staging_dir).with_context(|| {
        format!(
            "Failed to create staging directory {}",
            config.staging_dir.display()
        )
    })?;

    let gate = ProcessingGate::new(config.max_concurrent_processing);
    let runner = ToolRunner::new(gate, config.processing_timeout());
    let inspector = FfprobeInspector::new(config.ffprobe_path.clone(), runner.clone())
        .context("Invalid FFPROBE_PATH")?;
    let optimizer =
        FfmpegFastStart::new(config.ffmpeg_path.clone(), runner).context("Invalid FFMPEG_PATH")?;

    tracing::info!(
        ffprobe_path = %config.ffprobe_path,
        ffmpeg_path = %config.ffmpeg_path,
        timeout_secs = config.processing_timeout_secs,
        max_concurrent = config.max_concurrent_processing,
        "Media tools configured"
    );

    let videos: Arc<dyn VideoRepository> = Arc::new(PgVideoRepository::new(pool));
    let urls = AccessUrlIssuer::new(storage.storage.clone(), config.signed_url_ttl());
    let placement = ObjectPlacement::new(storage.storage.clone());

    let ingest = VideoIngestService::new(
        videos.clone(),
        Arc::new(inspector),
        Arc::new(optimizer),
        placement,
        urls.clone(),
        config.staging_dir.clone(),
        config.max_upload_size_bytes,
    );

    Ok(Arc::new(AppState {
        videos,
        ingest: Arc::new(ingest),
        urls,
        local_storage: storage.local,
        upload: UploadLimits {
            max_upload_size_bytes: config.max_upload_size_bytes,
            allowed_content_types: config.video_allowed_content_types.clone(),
        },
        security: SecurityConfig {
            jwt_secret: config.jwt_secret().to_string(),
            cors_origins: config.base.cors_origins.clone(),
        },
    }))
}
