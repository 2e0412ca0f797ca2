//! Access URL issuance for stored videos.

use crate::traits::{Storage, StorageResult};
use std::sync::Arc;
use std::time::Duration;
use tubely_core::StorageReference;

/// Validity window used when no TTL is configured.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(15 * 60);

/// Mints short-lived GET URLs from persisted storage references.
///
/// URLs are derived on demand and must never be written back to the record store.
#[derive(Clone)]
pub struct AccessUrlIssuer {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl AccessUrlIssuer {
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a GET for `reference` with the configured validity window.
    pub async fn sign(&self, reference: &StorageReference) -> StorageResult<String> {
        self.sign_with_ttl(reference, self.ttl).await
    }

    /// Sign with an explicit window. Fails for references missing a bucket or key.
    pub async fn sign_with_ttl(
        &self,
        reference: &StorageReference,
        ttl: Duration,
    ) -> StorageResult<String> {
        reference.validate()?;
        self.storage.presigned_get_url(reference, ttl).await
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use crate::{LocalStorage, StorageError};
    use tempfile::tempdir;

    async fn issuer(root: &std::path::Path, ttl: Duration) -> AccessUrlIssuer {
        let storage = LocalStorage::new(
            root.to_path_buf(),
            "http://localhost:8091/assets".to_string(),
            "local".to_string(),
            "secret",
        )
        .await
        .unwrap();
        AccessUrlIssuer::new(Arc::new(storage), ttl)
    }

    #[tokio::test]
    async fn test_sign_uses_configured_window() {
        let dir = tempdir().unwrap();
        let issuer = issuer(dir.path(), DEFAULT_SIGNED_URL_TTL).await;
        let reference = StorageReference::new("local", "portrait/abcd.mp4").unwrap();

        let url = issuer.sign(&reference).await.unwrap();
        let expires: u64 = url
            .split("expires=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap()
            .parse()
            .unwrap();
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();

        assert_eq!(issuer.ttl(), Duration::from_secs(900));
        assert!(expires > now + 890 && expires <= now + 900);
    }

    #[tokio::test]
    async fn test_sign_rejects_incomplete_reference() {
        let dir = tempdir().unwrap();
        let issuer = issuer(dir.path(), DEFAULT_SIGNED_URL_TTL).await;

        let missing_key = StorageReference::from_stored("local", "");
        let result = issuer.sign(&missing_key).await;
        assert!(matches!(result, Err(StorageError::InvalidReference(_))));
    }
}
