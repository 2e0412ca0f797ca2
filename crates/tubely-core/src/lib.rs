//! Tubely Core Library
//!
//! This crate provides the domain models, error types and configuration shared
//! by every Tubely component: the storage backends, the media processing tools,
//! the record store and the HTTP API.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{MediaProfile, Orientation, StorageReference, Video, VideoResponse};
pub use storage_types::StorageBackend;
