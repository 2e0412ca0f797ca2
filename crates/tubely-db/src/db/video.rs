use crate::db::VideoRepository;
use crate::error::{RecordError, RecordResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tubely_core::{StorageReference, Video};
use uuid::Uuid;

const VIDEO_COLUMNS: &str = "id, user_id, title, description, thumbnail_url, \
     video_bucket, video_key, created_at, updated_at";

/// Repository for video records
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Rebuild a reference from its two columns. A half-written pair is kept so
/// that signing can reject it instead of the row silently losing its media.
fn reference_from_columns(
    bucket: Option<String>,
    key: Option<String>,
) -> Option<StorageReference> {
    match (bucket, key) {
        (None, None) => None,
        (bucket, key) => Some(StorageReference::from_stored(
            bucket.unwrap_or_default(),
            key.unwrap_or_default(),
        )),
    }
}

fn video_from_row(row: &PgRow) -> Result<Video, sqlx::Error> {
    Ok(Video {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        thumbnail_url: row.try_get("thumbnail_url")?,
        video: reference_from_columns(row.try_get("video_bucket")?, row.try_get("video_key")?),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    async fn get_video(&self, id: Uuid) -> RecordResult<Option<Video>> {
        // Use dynamic SQLx queries to avoid requiring DATABASE_URL/sqlx prepare
        let row = sqlx::query(&format!("SELECT {} FROM videos WHERE id = $1", VIDEO_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(video_from_row).transpose()?)
    }

    #[tracing::instrument(skip(self, video), fields(video_id = %video.id))]
    async fn update_video(&self, video: &Video) -> RecordResult<Video> {
        let (bucket, key) = match &video.video {
            Some(reference) => (
                Some(reference.bucket().to_string()),
                Some(reference.key().to_string()),
            ),
            None => (None, None),
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE videos
            SET video_bucket = $2, video_key = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(bucket)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RecordError::NotFound(video.id))?;

        let updated = video_from_row(&row)?;
        tracing::debug!(updated_at = %updated.updated_at, "Video reference persisted");
        Ok(updated)
    }

    async fn create_video(
        &self,
        user_id: Uuid,
        title: String,
        description: Option<String>,
    ) -> RecordResult<Video> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO videos (id, user_id, title, description)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(video_from_row(&row)?)
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> RecordResult<Vec<Video>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM videos WHERE user_id = $1 ORDER BY created_at DESC",
            VIDEO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| video_from_row(row).map_err(RecordError::from))
            .collect()
    }
}
