use super::object_store_writer::{ObjectStoreSigner, ObjectStoreWriter};
use super::storage_interface::{StorageBackend, StorageError, StorageProvider};
use crate::domain::value_objects::{PublishTarget, StorageScheme};
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use std::sync::Arc;
use tracing::debug;

/// Builds cloud clients per call from ambient credentials.
///
/// GCS reads `GOOGLE_APPLICATION_CREDENTIALS` / `GOOGLE_SERVICE_ACCOUNT`;
/// S3 reads the standard `AWS_*` variables.
#[derive(Debug, Clone, Default)]
pub struct StorageFactory {
    aws_region: Option<String>,
}

impl StorageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the S3 client region instead of taking it from the environment
    pub fn with_aws_region(mut self, region: impl Into<String>) -> Self {
        self.aws_region = Some(region.into());
        self
    }
}

impl StorageProvider for StorageFactory {
    fn backend_for(&self, target: &PublishTarget) -> Result<StorageBackend, StorageError> {
        if !target.scheme().is_writable() {
            return Err(StorageError::UnsupportedScheme {
                uri: target.uri().to_string(),
            });
        }
        let (bucket, _) = target.object_location()?;

        debug!(scheme = %target.scheme(), bucket, "Creating storage client");

        match target.scheme() {
            StorageScheme::Gcs => {
                let gcs = GoogleCloudStorageBuilder::from_env()
                    .with_bucket_name(bucket)
                    .build()
                    .map_err(|source| StorageError::ClientInit {
                        scheme: StorageScheme::Gcs,
                        source,
                    })?;
                let gcs = Arc::new(gcs);

                Ok(StorageBackend {
                    writer: Arc::new(ObjectStoreWriter::new(gcs.clone())),
                    signer: Some(Arc::new(ObjectStoreSigner::new(gcs))),
                })
            }
            StorageScheme::S3 => {
                let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
                if let Some(region) = &self.aws_region {
                    builder = builder.with_region(region);
                }
                let s3 = builder.build().map_err(|source| StorageError::ClientInit {
                    scheme: StorageScheme::S3,
                    source,
                })?;

                // S3 objects are published through their public URL
                Ok(StorageBackend {
                    writer: Arc::new(ObjectStoreWriter::new(Arc::new(s3))),
                    signer: None,
                })
            }
            StorageScheme::Unsupported => Err(StorageError::UnsupportedScheme {
                uri: target.uri().to_string(),
            }),
        }
    }
}
