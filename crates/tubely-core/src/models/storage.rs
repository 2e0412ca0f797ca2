//! Storage reference model: where a video's media object lives.

use serde::{Deserialize, Serialize};

use super::media::Orientation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReference {
    #[error("storage reference is missing a bucket")]
    MissingBucket,
    #[error("storage reference is missing a key")]
    MissingKey,
}

/// Bucket and key of one stored object.
///
/// Persisted as two separate fields on the video record; never encoded into a
/// single delimited string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageReference {
    bucket: String,
    key: String,
}

impl StorageReference {
    /// Build a reference for a freshly placed object. Both parts must be non-empty.
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self, InvalidReference> {
        let reference = Self::from_stored(bucket, key);
        reference.validate()?;
        Ok(reference)
    }

    /// Rebuild a reference from persisted columns without validating it.
    ///
    /// Rows written by older code may hold empty values; signing rejects those.
    pub fn from_stored(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidReference> {
        if self.bucket.trim().is_empty() {
            return Err(InvalidReference::MissingBucket);
        }
        if self.key.trim().is_empty() {
            return Err(InvalidReference::MissingKey);
        }
        Ok(())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Orientation encoded in the key prefix (`portrait/...`), if any.
    pub fn orientation(&self) -> Option<Orientation> {
        self.key
            .split_once('/')
            .and_then(|(prefix, _)| prefix.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_parts() {
        assert_eq!(
            StorageReference::new("", "portrait/abc.mp4"),
            Err(InvalidReference::MissingBucket)
        );
        assert_eq!(
            StorageReference::new("videos", "  "),
            Err(InvalidReference::MissingKey)
        );
        assert!(StorageReference::new("videos", "portrait/abc.mp4").is_ok());
    }

    #[test]
    fn test_from_stored_defers_validation() {
        let reference = StorageReference::from_stored("videos", "");
        assert_eq!(reference.validate(), Err(InvalidReference::MissingKey));
    }

    #[test]
    fn test_orientation_from_key_prefix() {
        let reference = StorageReference::from_stored("videos", "landscape/00ff.mp4");
        assert_eq!(reference.orientation(), Some(Orientation::Landscape));

        let reference = StorageReference::from_stored("videos", "legacy.mp4");
        assert_eq!(reference.orientation(), None);
    }
}
