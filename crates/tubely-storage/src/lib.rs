//! Tubely Storage Library
//!
//! Object placement and access-URL issuance for uploaded videos. The
//! [`Storage`] trait is implemented for S3 (and S3-compatible providers) and
//! for the local filesystem.
//!
//! # Storage key format
//!
//! Keys are partitioned by orientation: `{orientation}/{32 hex chars}.mp4`,
//! where the hex part encodes 16 random bytes. Key generation is centralized
//! in the `keys` module so every backend stays consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod placement;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, StorageHandle};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use placement::ObjectPlacement;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use signing::{AccessUrlIssuer, DEFAULT_SIGNED_URL_TTL};
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
