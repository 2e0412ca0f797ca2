//! In-memory stand-ins for the record store, media tools and a broken backend.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tubely_core::{MediaProfile, StorageBackend, StorageReference, Video};
use tubely_db::{RecordError, RecordResult, VideoRepository};
use tubely_processing::{
    fast_start_output_path, ContainerOptimizer, MediaInspector, ProcessingError,
    ProcessingResult,
};
use tubely_storage::{Storage, StorageError, StorageResult};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: Mutex<HashMap<Uuid, Video>>,
    pub fail_updates: AtomicBool,
    pub updates: AtomicUsize,
}

impl InMemoryVideoRepository {
    pub fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn insert(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> RecordResult<Option<Video>> {
        Ok(self.get(id))
    }

    async fn update_video(&self, video: &Video) -> RecordResult<Video> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RecordError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut videos = self.videos.lock().unwrap();
        let stored = videos
            .get_mut(&video.id)
            .ok_or(RecordError::NotFound(video.id))?;
        stored.video = video.video.clone();
        stored.updated_at = Utc::now();
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(stored.clone())
    }

    async fn create_video(
        &self,
        user_id: Uuid,
        title: String,
        description: Option<String>,
    ) -> RecordResult<Video> {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            thumbnail_url: None,
            video: None,
            created_at: now,
            updated_at: now,
        };
        self.insert(video.clone());
        Ok(video)
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> RecordResult<Vec<Video>> {
        let mut videos: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }
}

/// Reports fixed geometry for any staged file.
pub struct StubInspector {
    profile: MediaProfile,
    pub fail: AtomicBool,
    pub time_out: AtomicBool,
    pub calls: AtomicUsize,
}

impl StubInspector {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            profile: MediaProfile::new(width, height),
            fail: AtomicBool::new(false),
            time_out: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaInspector for StubInspector {
    async fn inspect(&self, path: &Path) -> ProcessingResult<MediaProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !path.exists() {
            return Err(ProcessingError::Analysis(format!(
                "{} does not exist",
                path.display()
            )));
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProcessingError::Analysis("No video stream found".to_string()));
        }
        if self.time_out.load(Ordering::SeqCst) {
            return Err(ProcessingError::Timeout {
                tool: "ffprobe".to_string(),
                timeout: Duration::from_secs(300),
            });
        }
        Ok(self.profile)
    }
}

/// Copies the input to the fast-start output path unchanged.
#[derive(Default)]
pub struct StubOptimizer {
    pub fail: AtomicBool,
    pub time_out: AtomicBool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ContainerOptimizer for StubOptimizer {
    async fn optimize(&self, input: &Path) -> ProcessingResult<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProcessingError::Transcode(
                "ffmpeg exited with status 1".to_string(),
            ));
        }
        let output = fast_start_output_path(input);
        if self.time_out.load(Ordering::SeqCst) {
            // Killed mid-write.
            tokio::fs::write(&output, b"partial").await?;
            return Err(ProcessingError::Timeout {
                tool: "ffmpeg".to_string(),
                timeout: Duration::from_secs(300),
            });
        }
        tokio::fs::copy(input, &output).await?;
        Ok(output)
    }
}

/// Backend whose every operation fails.
pub struct FailingStorage {
    bucket: String,
}

impl FailingStorage {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl Storage for FailingStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_file(
        &self,
        key: &str,
        _path: &Path,
        _content_type: &str,
    ) -> StorageResult<StorageReference> {
        Err(StorageError::UploadFailed(format!("backend unavailable for {}", key)))
    }

    async fn presigned_get_url(
        &self,
        _reference: &StorageReference,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(StorageError::SigningFailed("backend unavailable".to_string()))
    }

    async fn exists(&self, _reference: &StorageReference) -> StorageResult<bool> {
        Ok(false)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
