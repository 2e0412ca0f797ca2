//! Object placement: derive a fresh key and upload a local file under it.

use crate::keys::generate_video_key;
use crate::traits::{Storage, StorageResult};
use std::path::Path;
use std::sync::Arc;
use tubely_core::{Orientation, StorageReference};

/// Places processed videos in the configured backend.
#[derive(Clone)]
pub struct ObjectPlacement {
    storage: Arc<dyn Storage>,
}

impl ObjectPlacement {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Upload `path` under a new `{orientation}/{random}.mp4` key.
    ///
    /// Not idempotent: each call creates a distinct object. Callers must not
    /// invoke it twice for one logical upload.
    #[tracing::instrument(skip(self, path), fields(bucket = %self.storage.bucket()))]
    pub async fn place(
        &self,
        path: &Path,
        content_type: &str,
        orientation: Orientation,
    ) -> StorageResult<StorageReference> {
        let key = generate_video_key(orientation);
        let reference = self.storage.put_file(&key, path, content_type).await?;

        tracing::info!(
            bucket = %reference.bucket(),
            key = %reference.key(),
            backend = %self.storage.backend_type(),
            "Video placed in storage"
        );

        Ok(reference)
    }
}
