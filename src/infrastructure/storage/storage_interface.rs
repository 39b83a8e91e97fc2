use crate::common::context::{Interrupted, RunContext};
use crate::domain::value_objects::{PublishTarget, StorageScheme, StorageUriError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unsupported storage URI '{uri}': expected gs://<bucket>/<key> or s3://<bucket>/<key>")]
    UnsupportedScheme { uri: String },

    #[error("Invalid storage URI: {0}")]
    InvalidUri(#[from] StorageUriError),

    #[error("Failed to initialize {scheme} client: {source}")]
    ClientInit {
        scheme: StorageScheme,
        #[source]
        source: object_store::Error,
    },

    #[error("Failed to write {uri}: {source}")]
    WriteFailed {
        uri: String,
        #[source]
        source: object_store::Error,
    },

    #[error("Failed to sign URL for {uri}: {source}")]
    SigningFailed {
        uri: String,
        #[source]
        source: object_store::Error,
    },

    #[error("Storage operation on {uri} interrupted: {reason}")]
    Interrupted { uri: String, reason: Interrupted },
}

impl StorageError {
    pub fn interrupted(target: &PublishTarget, reason: Interrupted) -> Self {
        Self::Interrupted {
            uri: target.uri().to_string(),
            reason,
        }
    }
}

/// Writes one object to a bucket
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageWriter: Send + Sync {
    /// Store `payload` at `target` with the given `Content-Type`.
    ///
    /// An existing object is overwritten.
    async fn write(
        &self,
        ctx: &RunContext,
        target: &PublishTarget,
        payload: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

/// Produces time-limited read URLs for stored objects
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlSigner: Send + Sync {
    async fn signed_url(
        &self,
        ctx: &RunContext,
        target: &PublishTarget,
        expires_in: Duration,
    ) -> Result<String, StorageError>;
}

/// Clients for one backend: a writer, plus a signer when the backend
/// publishes through signed URLs
#[derive(Clone)]
pub struct StorageBackend {
    pub writer: Arc<dyn StorageWriter>,
    pub signer: Option<Arc<dyn UrlSigner>>,
}

/// Selects the backend for a target by its URI scheme
#[cfg_attr(test, mockall::automock)]
pub trait StorageProvider: Send + Sync {
    /// Build clients for `target`. Unsupported schemes fail here, before any
    /// client is constructed.
    fn backend_for(&self, target: &PublishTarget) -> Result<StorageBackend, StorageError>;
}
