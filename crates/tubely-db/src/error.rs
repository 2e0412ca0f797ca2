use thiserror::Error;
use tubely_core::AppError;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Video not found: {0}")]
    NotFound(uuid::Uuid),
}

pub type RecordResult<T> = Result<T, RecordError>;

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound(id) => AppError::NotFound(format!("Video {} not found", id)),
            other => AppError::Record(other.to_string()),
        }
    }
}
