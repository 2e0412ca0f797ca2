//! Shared key generation for storage backends.
//!
//! Key format: `{orientation}/{hex(16 random bytes)}.{extension}`.

use crate::traits::{StorageError, StorageResult};
use rand::RngCore;
use tubely_core::Orientation;

/// Number of random bytes encoded in each key.
pub const KEY_RANDOM_BYTES: usize = 16;

/// Extension for stored video objects (fast-start MP4 containers).
pub const VIDEO_KEY_EXTENSION: &str = "mp4";

/// Generate a fresh storage key for a video of the given orientation.
///
/// Every call yields a new key, so placing the same file twice creates two objects.
pub fn generate_video_key(orientation: Orientation) -> String {
    let mut bytes = [0u8; KEY_RANDOM_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    format!(
        "{}/{}.{}",
        orientation.as_str(),
        hex::encode(bytes),
        VIDEO_KEY_EXTENSION
    )
}

/// Reject keys that could escape a backend's namespace.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
