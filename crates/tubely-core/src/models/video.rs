use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::media::Orientation;
use super::storage::StorageReference;

/// A video record as held by the record store.
///
/// The upload pipeline reads `user_id` for the ownership check and writes
/// `video` once placement succeeds; every other field belongs to the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video: Option<StorageReference>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn storage_reference(&self) -> Option<&StorageReference> {
        self.video.as_ref()
    }
}

/// Video as returned to clients. `video_url` is a short-lived signed URL, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub orientation: Option<Orientation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    /// Render a record with the given signed URL (or none).
    pub fn from_video(video: Video, video_url: Option<String>) -> Self {
        let orientation = video.video.as_ref().and_then(StorageReference::orientation);
        VideoResponse {
            id: video.id,
            user_id: video.user_id,
            title: video.title,
            description: video.description,
            thumbnail_url: video.thumbnail_url,
            video_url,
            orientation,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}
