use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Region used for S3 public URLs when none is configured
pub const DEFAULT_AWS_REGION: &str = "ap-northeast-1";

const GCS_PREFIX: &str = "gs://";
const S3_PREFIX: &str = "s3://";

/// Storage URI errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageUriError {
    #[error("Storage URI is missing a bucket: {0}")]
    MissingBucket(String),

    #[error("Storage URI is missing an object key: {0}")]
    MissingKey(String),

    #[error("Unsupported storage URI: {0}")]
    UnsupportedScheme(String),
}

/// Object storage backend selected by URI prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageScheme {
    /// Google Cloud Storage (`gs://`)
    Gcs,
    /// Amazon S3 (`s3://`)
    S3,
    /// Anything else: local paths, `file://`, unknown providers
    Unsupported,
}

impl StorageScheme {
    /// Detect the scheme from the URI prefix alone
    pub fn detect(uri: &str) -> Self {
        if uri.starts_with(GCS_PREFIX) {
            Self::Gcs
        } else if uri.starts_with(S3_PREFIX) {
            Self::S3
        } else {
            Self::Unsupported
        }
    }

    /// Whether objects can be written to this backend
    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

impl fmt::Display for StorageScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageScheme::Gcs => write!(f, "gcs"),
            StorageScheme::S3 => write!(f, "s3"),
            StorageScheme::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Where a review artifact is published: a bucket and key on one backend.
///
/// Parsing is purely syntactic and never fails; whether the target can
/// actually be written is checked with [`PublishTarget::object_location`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublishTarget {
    uri: String,
    scheme: StorageScheme,
    bucket: String,
    key: String,
}

impl PublishTarget {
    /// Parse `uri` into scheme, bucket and key
    pub fn parse(uri: &str) -> Self {
        let uri = uri.trim();
        let scheme = StorageScheme::detect(uri);

        let remainder = match scheme {
            StorageScheme::Gcs => &uri[GCS_PREFIX.len()..],
            StorageScheme::S3 => &uri[S3_PREFIX.len()..],
            StorageScheme::Unsupported => {
                return Self {
                    uri: uri.to_string(),
                    scheme,
                    bucket: String::new(),
                    key: String::new(),
                }
            }
        };

        // Bucket and key split on the first "/"
        let (bucket, key) = match remainder.split_once('/') {
            Some((bucket, key)) => (bucket, key),
            None => (remainder, ""),
        };

        Self {
            uri: uri.to_string(),
            scheme,
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    /// The URI as given
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn scheme(&self) -> StorageScheme {
        self.scheme
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Bucket and key of a writable target
    pub fn object_location(&self) -> Result<(&str, &str), StorageUriError> {
        if !self.scheme.is_writable() {
            return Err(StorageUriError::UnsupportedScheme(self.uri.clone()));
        }
        if self.bucket.is_empty() {
            return Err(StorageUriError::MissingBucket(self.uri.clone()));
        }
        if self.key.is_empty() || self.key.ends_with('/') {
            return Err(StorageUriError::MissingKey(self.uri.clone()));
        }
        Ok((&self.bucket, &self.key))
    }

    /// Virtual-hosted-style URL of an S3 object:
    /// `https://{bucket}.s3.{region}.amazonaws.com/{key}`
    pub fn s3_public_url(&self, region: &str) -> Option<String> {
        match self.scheme {
            StorageScheme::S3 => Some(format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, region, self.key
            )),
            _ => None,
        }
    }
}

impl fmt::Display for PublishTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)
    }
}
