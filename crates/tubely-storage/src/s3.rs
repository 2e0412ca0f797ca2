use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::buffered::BufWriter;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, Attributes, ObjectStore, ObjectStoreExt, Result as ObjectResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tubely_core::StorageReference;

/// Buffered before switching to a multipart upload; also the part size.
const UPLOAD_PART_SIZE: usize = 10 * 1024 * 1024;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name new objects are placed in
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let store = Self::build_store(&bucket, &region, endpoint_url.as_deref())?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    // Credentials come from the standard AWS environment variables.
    fn build_store(bucket: &str, region: &str, endpoint: Option<&str>) -> StorageResult<AmazonS3> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket);

        if let Some(endpoint) = endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    /// Store able to sign for `bucket`. References persisted before a bucket
    /// change still name their original bucket.
    fn store_for(&self, bucket: &str) -> StorageResult<AmazonS3> {
        if bucket == self.bucket {
            return Ok(self.store.clone());
        }
        Self::build_store(bucket, &self.region, self.endpoint_url.as_deref())
    }
}

/// Copy `file` into `store` without holding it in memory. Objects larger than
/// `part_size` go up as a multipart upload, which is aborted on failure.
async fn stream_file(
    store: Arc<dyn ObjectStore>,
    location: ObjectPath,
    mut file: tokio::fs::File,
    content_type: &str,
    part_size: usize,
) -> std::io::Result<u64> {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, content_type.to_string().into());

    let mut writer = BufWriter::with_capacity(store, location, part_size).with_attributes(attributes);

    let copied = match tokio::io::copy(&mut file, &mut writer).await {
        Ok(size) => writer.shutdown().await.map(|_| size),
        Err(e) => Err(e),
    };

    if copied.is_err() {
        if let Err(e) = writer.abort().await {
            tracing::warn!(error = %e, "Failed to abort multipart upload");
        }
    }

    copied
}

#[async_trait]
impl Storage for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<StorageReference> {
        validate_key(key)?;
        let file = tokio::fs::File::open(path).await?;
        let location = ObjectPath::from(key.to_string());
        let store: Arc<dyn ObjectStore> = Arc::new(self.store.clone());

        let start = std::time::Instant::now();

        let size = stream_file(store, location, file, content_type, UPLOAD_PART_SIZE)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StorageReference::new(self.bucket.clone(), key)?)
    }

    async fn presigned_get_url(
        &self,
        reference: &StorageReference,
        expires_in: Duration,
    ) -> StorageResult<String> {
        reference.validate()?;
        let store = self.store_for(reference.bucket())?;
        let location = ObjectPath::from(reference.key().to_string());

        let url_result: ObjectResult<_> =
            store.signed_url(Method::GET, &location, expires_in).await;

        let url = url_result
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?
            .to_string();

        Ok(url)
    }

    async fn exists(&self, reference: &StorageReference) -> StorageResult<bool> {
        let store = self.store_for(reference.bucket())?;
        let location = ObjectPath::from(reference.key().to_string());
        match store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
