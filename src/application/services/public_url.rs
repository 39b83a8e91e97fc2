use crate::common::context::RunContext;
use crate::domain::value_objects::{PublishTarget, StorageScheme, DEFAULT_AWS_REGION};
use crate::infrastructure::storage::UrlSigner;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifetime of signed GCS links
pub const DEFAULT_SIGNED_URL_EXPIRY: Duration = Duration::from_secs(30 * 60);

/// Turns a storage URI into a link a person can open.
///
/// GCS objects get a signed GET URL, S3 objects their virtual-hosted public
/// URL. Resolution never fails: when no better link can be produced the
/// storage URI itself is returned.
#[derive(Debug, Clone)]
pub struct PublicUrlResolver {
    aws_region: String,
    signed_url_expiry: Duration,
}

impl Default for PublicUrlResolver {
    fn default() -> Self {
        Self {
            aws_region: DEFAULT_AWS_REGION.to_string(),
            signed_url_expiry: DEFAULT_SIGNED_URL_EXPIRY,
        }
    }
}

impl PublicUrlResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Region from `AWS_REGION`, falling back to the default when unset or blank
    pub fn from_env() -> Self {
        let resolver = Self::default();
        match std::env::var("AWS_REGION") {
            Ok(region) if !region.trim().is_empty() => resolver.with_aws_region(region.trim()),
            _ => resolver,
        }
    }

    pub fn with_aws_region(mut self, region: impl Into<String>) -> Self {
        self.aws_region = region.into();
        self
    }

    pub fn with_signed_url_expiry(mut self, expiry: Duration) -> Self {
        self.signed_url_expiry = expiry;
        self
    }

    pub fn aws_region(&self) -> &str {
        &self.aws_region
    }

    pub fn signed_url_expiry(&self) -> Duration {
        self.signed_url_expiry
    }

    pub async fn resolve(
        &self,
        ctx: &RunContext,
        target: &PublishTarget,
        signer: Option<&dyn UrlSigner>,
    ) -> String {
        match target.scheme() {
            StorageScheme::Gcs => {
                let Some(signer) = signer else {
                    warn!(uri = %target, "No URL signer for GCS target, using storage URI");
                    return target.uri().to_string();
                };

                match signer
                    .signed_url(ctx, target, self.signed_url_expiry)
                    .await
                {
                    Ok(url) => {
                        info!(uri = %target, expiry_secs = self.signed_url_expiry.as_secs(), "Generated signed URL");
                        url
                    }
                    Err(e) => {
                        warn!(uri = %target, error = %e, "Failed to sign URL, using storage URI");
                        target.uri().to_string()
                    }
                }
            }
            StorageScheme::S3 => match target.s3_public_url(&self.aws_region) {
                Some(url) => {
                    info!(url = %url, "Converted S3 URI to public URL");
                    url
                }
                None => target.uri().to_string(),
            },
            StorageScheme::Unsupported => {
                debug!(uri = %target, "No public URL form for this URI");
                target.uri().to_string()
            }
        }
    }
}
