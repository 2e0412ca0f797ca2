//! Database repositories

pub mod video;

pub use video::PgVideoRepository;

use crate::error::RecordResult;
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tubely_core::{Config, Video};
use uuid::Uuid;

/// Embedded migrations from `crates/tubely-db/migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Video record store.
///
/// The upload pipeline reads a record once per request and writes its media
/// reference once per successful placement.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn get_video(&self, id: Uuid) -> RecordResult<Option<Video>>;

    /// Persist `video.video` and bump `updated_at`. No other column is written.
    ///
    /// Unconditional: concurrent uploads to one video resolve last-write-wins.
    async fn update_video(&self, video: &Video) -> RecordResult<Video>;

    async fn create_video(
        &self,
        user_id: Uuid,
        title: String,
        description: Option<String>,
    ) -> RecordResult<Video>;

    /// Newest first.
    async fn list_videos_for_user(&self, user_id: Uuid) -> RecordResult<Vec<Video>>;
}

/// Open the connection pool and apply pending migrations.
pub async fn connect(config: &Config) -> RecordResult<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.base.db_max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.base.database_url)
        .await?;

    tracing::info!(
        max_connections = config.base.db_max_connections,
        "Database connected successfully"
    );

    MIGRATOR.run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
