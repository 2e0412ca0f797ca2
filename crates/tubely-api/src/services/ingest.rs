//! Video ingestion: stage → inspect → optimize → place → persist → respond.
//!
//! Authentication and media-type validation happen in the HTTP layer before
//! [`VideoIngestService::ingest`] is called. Every local artifact lives in one
//! per-request [`TempDir`], so any early return removes it.

use crate::constants::{STAGED_FILE_NAME, STAGING_DIR_PREFIX};
use crate::error::HttpAppError;
use crate::services::signing::render_video;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::Instrument;
use tubely_core::{AppError, ErrorMetadata, Video, VideoResponse};
use tubely_db::VideoRepository;
use tubely_processing::{ContainerOptimizer, MediaInspector};
use tubely_storage::{AccessUrlIssuer, ObjectPlacement};
use uuid::Uuid;

/// Step of the upload at which a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Authenticate,
    Validate,
    Authorize,
    Stage,
    Inspect,
    Optimize,
    Place,
    Persist,
}

impl UploadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStage::Authenticate => "auth",
            UploadStage::Validate => "validate",
            UploadStage::Authorize => "authz",
            UploadStage::Stage => "stage",
            UploadStage::Inspect => "inspect",
            UploadStage::Optimize => "optimize",
            UploadStage::Place => "place",
            UploadStage::Persist => "persist",
        }
    }
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of an upload, tagged with the stage that produced it.
#[derive(Debug, thiserror::Error)]
#[error("upload failed at {stage}: {source}")]
pub struct UploadError {
    pub stage: UploadStage,
    #[source]
    pub source: AppError,
}

impl UploadError {
    pub fn new(stage: UploadStage, source: impl Into<AppError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

impl From<UploadError> for HttpAppError {
    fn from(err: UploadError) -> Self {
        tracing::warn!(
            stage = %err.stage,
            code = err.source.error_code(),
            error = %err.source.detailed_message(),
            "Video upload failed"
        );
        HttpAppError(err.source)
    }
}

/// One upload, after authentication and media-type validation.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub video_id: Uuid,
    pub user_id: Uuid,
    /// Normalized media type, recorded as object metadata.
    pub content_type: String,
}

/// Raw upload bytes on local disk. Dropping it removes the staging directory.
struct StagedUpload {
    dir: TempDir,
    path: PathBuf,
    size: u64,
}

pub struct VideoIngestService {
    videos: Arc<dyn VideoRepository>,
    inspector: Arc<dyn MediaInspector>,
    optimizer: Arc<dyn ContainerOptimizer>,
    placement: ObjectPlacement,
    urls: AccessUrlIssuer,
    staging_dir: PathBuf,
    max_upload_size_bytes: usize,
}

impl VideoIngestService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        inspector: Arc<dyn MediaInspector>,
        optimizer: Arc<dyn ContainerOptimizer>,
        placement: ObjectPlacement,
        urls: AccessUrlIssuer,
        staging_dir: PathBuf,
        max_upload_size_bytes: usize,
    ) -> Self {
        Self {
            videos,
            inspector,
            optimizer,
            placement,
            urls,
            staging_dir,
            max_upload_size_bytes,
        }
    }

    /// Run the pipeline for one upload and return the updated record with a
    /// freshly signed URL.
    pub async fn ingest<S, E>(
        &self,
        request: IngestRequest,
        body: S,
    ) -> Result<VideoResponse, UploadError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Display,
    {
        let span = tracing::info_span!(
            "ingest_video",
            video_id = %request.video_id,
            user_id = %request.user_id,
            content_type = %request.content_type,
        );
        self.run(request, body).instrument(span).await
    }

    async fn run<S, E>(&self, request: IngestRequest, body: S) -> Result<VideoResponse, UploadError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Display,
    {
        let start = Instant::now();

        // Record lookup and ownership come first so nothing is written for
        // callers who may not touch this video.
        let mut video = self
            .authorize(request.video_id, request.user_id)
            .await?;

        let staged = self.stage(body).await?;
        tracing::debug!(
            stage = %UploadStage::Stage,
            size_bytes = staged.size,
            path = %staged.path.display(),
            "Upload staged"
        );

        let profile = self
            .inspector
            .inspect(&staged.path)
            .await
            .map_err(|e| UploadError::new(UploadStage::Inspect, e))?;
        tracing::info!(
            stage = %UploadStage::Inspect,
            width = profile.width(),
            height = profile.height(),
            orientation = %profile.orientation(),
            "Upload inspected"
        );

        let optimized = self
            .optimizer
            .optimize(&staged.path)
            .await
            .map_err(|e| UploadError::new(UploadStage::Optimize, e))?;
        discard(&staged.path).await;

        let reference = self
            .placement
            .place(&optimized, &request.content_type, profile.orientation())
            .await
            .map_err(|e| UploadError::new(UploadStage::Place, e))?;

        // Nothing on disk is needed past this point.
        cleanup(staged);

        video.video = Some(reference.clone());
        let updated = match self.videos.update_video(&video).await {
            Ok(updated) => updated,
            Err(e) => {
                // No compensation: the placed object stays until an out-of-band sweep.
                tracing::error!(
                    stage = %UploadStage::Persist,
                    bucket = %reference.bucket(),
                    key = %reference.key(),
                    error = %e,
                    "Stored object is orphaned: record update failed"
                );
                return Err(UploadError::new(UploadStage::Persist, e));
            }
        };

        tracing::info!(
            bucket = %reference.bucket(),
            key = %reference.key(),
            duration_ms = start.elapsed().as_millis(),
            "Video upload complete"
        );

        Ok(render_video(&self.urls, updated).await)
    }

    /// Fetch the record and check the caller owns it.
    pub async fn authorize(&self, video_id: Uuid, user_id: Uuid) -> Result<Video, UploadError> {
        let video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(|e| UploadError::new(UploadStage::Authorize, e))?
            .ok_or_else(|| {
                UploadError::new(
                    UploadStage::Authorize,
                    AppError::NotFound("Couldn't find video".to_string()),
                )
            })?;

        if !video.is_owned_by(user_id) {
            return Err(UploadError::new(
                UploadStage::Authorize,
                AppError::Forbidden("Not authorized to update this video".to_string()),
            ));
        }

        Ok(video)
    }

    /// Stream the body into a fresh staging directory, enforcing the size ceiling.
    async fn stage<S, E>(&self, body: S) -> Result<StagedUpload, UploadError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let io_error = |e: std::io::Error| UploadError::new(UploadStage::Stage, AppError::Io(e));

        tokio::fs::create_dir_all(&self.staging_dir)
            .await
            .map_err(io_error)?;
        let dir = tempfile::Builder::new()
            .prefix(STAGING_DIR_PREFIX)
            .tempdir_in(&self.staging_dir)
            .map_err(io_error)?;
        let path = dir.path().join(STAGED_FILE_NAME);
        let mut file = tokio::fs::File::create(&path).await.map_err(io_error)?;

        let limit = self.max_upload_size_bytes as u64;
        let mut size: u64 = 0;
        let mut body = std::pin::pin!(body);
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                UploadError::new(
                    UploadStage::Validate,
                    AppError::BadRequest(format!("Couldn't read the uploaded file: {}", e)),
                )
            })?;
            size += chunk.len() as u64;
            if size > limit {
                return Err(UploadError::new(
                    UploadStage::Validate,
                    AppError::BadRequest(format!(
                        "Upload exceeds the maximum size of {} bytes",
                        limit
                    )),
                ));
            }
            file.write_all(&chunk).await.map_err(io_error)?;
        }
        file.flush().await.map_err(io_error)?;

        if size == 0 {
            return Err(UploadError::new(
                UploadStage::Validate,
                AppError::BadRequest("Uploaded video is empty".to_string()),
            ));
        }

        Ok(StagedUpload { dir, path, size })
    }
}

/// Remove the raw upload once its optimized copy exists.
async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
    }
}

fn cleanup(staged: StagedUpload) {
    let dir = staged.dir.path().to_path_buf();
    if let Err(e) = staged.dir.close() {
        tracing::warn!(path = %dir.display(), error = %e, "Failed to remove staging directory");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        assert_eq!(UploadStage::Authorize.to_string(), "authz");
        assert_eq!(UploadStage::Optimize.to_string(), "optimize");
    }

    #[test]
    fn test_upload_error_keeps_cause() {
        let err = UploadError::new(
            UploadStage::Inspect,
            AppError::Analysis("No video stream found".into()),
        );
        assert_eq!(err.stage, UploadStage::Inspect);
        assert_eq!(err.source.error_code(), "ANALYSIS_ERROR");
        assert!(err.to_string().starts_with("upload failed at inspect"));
    }
}
