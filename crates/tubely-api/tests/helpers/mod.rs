//! Test helpers: build AppState and router over in-memory collaborators.
//!
//! The record store and media tools are replaced by doubles; storage is the
//! real local backend in a temporary directory. No database or ffmpeg needed.

#![allow(dead_code)]

pub mod doubles;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use doubles::{FailingStorage, InMemoryVideoRepository, StubInspector, StubOptimizer};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tubely_api::auth::issue_access_token;
use tubely_api::constants;
use tubely_api::services::ingest::VideoIngestService;
use tubely_api::setup::routes;
use tubely_api::state::{AppState, SecurityConfig, UploadLimits};
use tubely_core::Video;
use tubely_db::VideoRepository;
use tubely_storage::{AccessUrlIssuer, LocalStorage, ObjectPlacement, Storage};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_BUCKET: &str = "tubely-test";
pub const TEST_BASE_URL: &str = "http://localhost:8091/assets";
pub const MAX_UPLOAD_SIZE: usize = 64 * 1024;

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Knobs for [`setup_test_app_with`].
pub struct TestOptions {
    /// Geometry reported by the stub inspector.
    pub width: u32,
    pub height: u32,
    /// Place objects in a backend that rejects every write.
    pub failing_storage: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            failing_storage: false,
        }
    }
}

/// Test application: server plus handles on every collaborator.
pub struct TestApp {
    pub server: TestServer,
    pub repo: Arc<InMemoryVideoRepository>,
    pub inspector: Arc<StubInspector>,
    pub optimizer: Arc<StubOptimizer>,
    pub local: Arc<LocalStorage>,
    pub staging_dir: TempDir,
    pub storage_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Create a video record owned by `user_id` with no media attached.
    pub async fn seed_video(&self, user_id: Uuid) -> Video {
        self.repo
            .create_video(user_id, "Boots demo".to_string(), None)
            .await
            .expect("Failed to seed video")
    }

    pub fn staging_entries(&self) -> usize {
        count_entries(self.staging_dir.path())
    }

    pub fn stored_objects(&self) -> usize {
        count_files(self.storage_dir.path())
    }

    /// POST a multipart upload with one `video` field.
    pub async fn upload(
        &self,
        video_id: &str,
        token: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> TestResponse {
        let part = Part::bytes(bytes::Bytes::from(bytes))
            .file_name("boots.mp4")
            .mime_type(content_type);
        let form = MultipartForm::new().add_part(constants::VIDEO_FIELD_NAME, part);

        self.server
            .post(&api_path(&format!("/videos/{}/video", video_id)))
            .add_header("Authorization", format!("Bearer {}", token))
            .multipart(form)
            .await
    }
}

pub fn token_for(user_id: Uuid) -> String {
    issue_access_token(user_id, TEST_JWT_SECRET, Duration::from_secs(3600))
        .expect("Failed to issue test token")
}

/// Bytes standing in for an MP4; the stub inspector never parses them.
pub fn fake_mp4(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let staging_dir = tempfile::tempdir().expect("Failed to create staging directory");
    let storage_dir = tempfile::tempdir().expect("Failed to create storage directory");

    let local = Arc::new(
        LocalStorage::new(
            storage_dir.path(),
            TEST_BASE_URL.to_string(),
            TEST_BUCKET.to_string(),
            TEST_JWT_SECRET.as_bytes(),
        )
        .await
        .expect("Failed to create local storage"),
    );
    let storage: Arc<dyn Storage> = if options.failing_storage {
        Arc::new(FailingStorage::new(TEST_BUCKET))
    } else {
        local.clone()
    };

    let repo = Arc::new(InMemoryVideoRepository::default());
    let inspector = Arc::new(StubInspector::new(options.width, options.height));
    let optimizer = Arc::new(StubOptimizer::default());
    let urls = AccessUrlIssuer::new(storage.clone(), Duration::from_secs(15 * 60));

    let ingest = VideoIngestService::new(
        repo.clone(),
        inspector.clone(),
        optimizer.clone(),
        ObjectPlacement::new(storage),
        urls.clone(),
        staging_dir.path().to_path_buf(),
        MAX_UPLOAD_SIZE,
    );

    let state = Arc::new(AppState {
        videos: repo.clone(),
        ingest: Arc::new(ingest),
        urls,
        local_storage: Some(local.clone()),
        upload: UploadLimits {
            max_upload_size_bytes: MAX_UPLOAD_SIZE,
            allowed_content_types: vec!["video/mp4".to_string()],
        },
        security: SecurityConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            cors_origins: vec!["*".to_string()],
        },
    });

    let app = routes::setup_routes(state).expect("Failed to build router");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        repo,
        inspector,
        optimizer,
        local,
        staging_dir,
        storage_dir,
    }
}

fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}
