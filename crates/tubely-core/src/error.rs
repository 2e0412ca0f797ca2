//! Error types module
//!
//! All failures a request can end in are unified under [`AppError`]. Each crate
//! keeps its own error enum (storage, processing, record store) and converts
//! into `AppError` at the boundary, so the HTTP layer only has to know one type.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Media analysis error: {0}")]
    Analysis(String),

    #[error("Transcode error: {0}")]
    Transcode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Record store error: {0}")]
    Record(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Unauthenticated(_) => (401, "UNAUTHENTICATED", false, LogLevel::Debug),
        AppError::Forbidden(_) => (403, "FORBIDDEN", false, LogLevel::Debug),
        AppError::BadRequest(_) => (400, "BAD_REQUEST", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::Io(_) => (500, "IO_ERROR", true, LogLevel::Error),
        AppError::Analysis(_) => (500, "ANALYSIS_ERROR", true, LogLevel::Warn),
        AppError::Transcode(_) => (500, "TRANSCODE_ERROR", true, LogLevel::Warn),
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::Record(_) => (500, "RECORD_ERROR", true, LogLevel::Error),
        AppError::Signing(_) => (500, "SIGNING_ERROR", true, LogLevel::Warn),
        AppError::Timeout(_) => (500, "TIMEOUT", false, LogLevel::Warn),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Variant name, used as the `error_type` field in logs and non-production responses.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Unauthenticated(_) => "Unauthenticated",
            AppError::Forbidden(_) => "Forbidden",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Io(_) => "IOError",
            AppError::Analysis(_) => "AnalysisError",
            AppError::Transcode(_) => "TranscodeError",
            AppError::Storage(_) => "StorageError",
            AppError::Record(_) => "RecordError",
            AppError::Signing(_) => "SigningError",
            AppError::Timeout(_) => "Timeout",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Full message including the source chain, for logs and non-production responses.
    pub fn detailed_message(&self) -> String {
        match self {
            AppError::InternalWithSource { message, source } => {
                format!("{}: {:#}", message, source)
            }
            other => other.to_string(),
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::Io(_) => "Failed to stage the uploaded file".to_string(),
            AppError::Analysis(_) => "Unable to analyze the uploaded video".to_string(),
            AppError::Transcode(_) => "Unable to process the uploaded video".to_string(),
            AppError::Storage(_) => "Failed to store the video".to_string(),
            AppError::Record(_) => "Failed to update the video record".to_string(),
            AppError::Signing(_) => "Failed to generate a video URL".to_string(),
            AppError::Timeout(msg) => format!("Processing timed out: {}", msg),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "An internal error occurred".to_string()
            }
        }
    }
}
