use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tubely_core::StorageReference;

type HmacSha256 = Hmac<Sha256>;

/// Local filesystem storage implementation
///
/// Objects live under `base_path/<key>`. GET URLs are signed with an
/// HMAC over `bucket|key|expires` and verified by the asset route.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    bucket: String,
    signing_secret: Vec<u8>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored objects (e.g., "/var/lib/tubely/videos")
    /// * `base_url` - Public URL the asset route is mounted at (e.g., "http://localhost:8091/assets")
    /// * `bucket` - Bucket name recorded on references placed here
    /// * `signing_secret` - HMAC key for access URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        bucket: String,
        signing_secret: impl Into<Vec<u8>>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            bucket,
            signing_secret: signing_secret.into(),
        })
    }

    /// Map a key to a path inside `base_path`, rejecting anything that escapes it.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        // Only existing paths can be canonicalized; symlinks inside the root
        // must not point outside it.
        if let Ok(canonical) = path.canonicalize() {
            Self::check_within(&canonical, &base_canonical)?;
        }

        Ok(path)
    }

    fn check_within(canonical: &Path, base_canonical: &Path) -> StorageResult<()> {
        if canonical.strip_prefix(base_canonical).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }
        Ok(())
    }

    fn signature(&self, bucket: &str, key: &str, expires: u64) -> StorageResult<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_secret)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(format!("{}|{}|{}", bucket, key, expires).as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Verify the `expires`/`signature` query pair of a signed GET URL.
    pub fn verify_signed_request(
        &self,
        storage_key: &str,
        expires: u64,
        signature: &str,
    ) -> StorageResult<()> {
        let provided = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| StorageError::SigningFailed("Malformed signature".to_string()))?;

        let mut mac = HmacSha256::new_from_slice(&self.signing_secret)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(format!("{}|{}|{}", self.bucket, storage_key, expires).as_bytes());
        mac.verify_slice(&provided)
            .map_err(|_| StorageError::SigningFailed("Signature mismatch".to_string()))?;

        if unix_now() > expires {
            return Err(StorageError::SigningFailed(
                "Signed URL has expired".to_string(),
            ));
        }

        Ok(())
    }

    /// Open a stored object for streaming, with its length in bytes.
    /// Missing objects yield `NotFound`.
    pub async fn open(&self, storage_key: &str) -> StorageResult<(fs::File, u64)> {
        let path = self.key_to_path(storage_key)?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        Ok((file, metadata.len()))
    }

    /// Create the parent directory of a new object and confirm it did not
    /// resolve outside the root through a symlinked prefix.
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        fs::create_dir_all(parent).await?;

        let parent_canonical = fs::canonicalize(parent).await?;
        let base_canonical = fs::canonicalize(&self.base_path).await?;
        Self::check_within(&parent_canonical, &base_canonical)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<StorageReference> {
        let target = self.key_to_path(key)?;
        self.ensure_parent_dir(&target).await?;

        let start = std::time::Instant::now();

        let size = fs::copy(path, &target).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                path.display(),
                target.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %target.display(),
            key = %key,
            size_bytes = size,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StorageReference::new(self.bucket.clone(), key)?)
    }

    async fn presigned_get_url(
        &self,
        reference: &StorageReference,
        expires_in: Duration,
    ) -> StorageResult<String> {
        reference.validate()?;
        if reference.bucket() != self.bucket {
            return Err(StorageError::SigningFailed(format!(
                "Bucket {} is not served by local storage",
                reference.bucket()
            )));
        }
        self.key_to_path(reference.key())?;

        let expires = unix_now().saturating_add(expires_in.as_secs());
        let signature = self.signature(reference.bucket(), reference.key(), expires)?;

        Ok(format!(
            "{}/{}?expires={}&signature={}",
            self.base_url.trim_end_matches('/'),
            reference.key(),
            expires,
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    async fn exists(&self, reference: &StorageReference) -> StorageResult<bool> {
        if reference.bucket() != self.bucket {
            return Ok(false);
        }
        let path = self.key_to_path(reference.key())?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
