use std::time::Duration;
use thiserror::Error;
use tubely_core::AppError;

/// Failures of the external media tools.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// ffprobe failed, printed unparseable output, or found no video stream.
    #[error("Media analysis failed: {0}")]
    Analysis(String),

    /// ffmpeg failed or left no output file.
    #[error("Fast-start remux failed: {0}")]
    Transcode(String),

    #[error("{tool} did not finish within {}s", .timeout.as_secs())]
    Timeout { tool: String, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tool path: {0}")]
    InvalidToolPath(String),

    #[error("Processing gate closed")]
    GateClosed,
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::Analysis(msg) => AppError::Analysis(msg),
            ProcessingError::Transcode(msg) => AppError::Transcode(msg),
            err @ ProcessingError::Timeout { .. } => AppError::Timeout(err.to_string()),
            ProcessingError::Io(e) => AppError::Io(e),
            other => AppError::Internal(other.to_string()),
        }
    }
}
