use super::storage_interface::{StorageError, StorageWriter, UrlSigner};
use crate::common::context::RunContext;
use crate::domain::value_objects::PublishTarget;
use async_trait::async_trait;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// [`StorageWriter`] over any `object_store` backend bound to one bucket
#[derive(Debug, Clone)]
pub struct ObjectStoreWriter {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreWriter {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

fn object_path(target: &PublishTarget) -> Result<ObjectPath, StorageError> {
    let (_, key) = target.object_location()?;
    Ok(ObjectPath::from(key))
}

#[async_trait]
impl StorageWriter for ObjectStoreWriter {
    async fn write(
        &self,
        ctx: &RunContext,
        target: &PublishTarget,
        payload: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let location = object_path(target)?;
        let size = payload.len();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        debug!(uri = %target, bytes = size, content_type, "Writing object");

        ctx.run(self.store.put_opts(&location, payload.into(), options))
            .await
            .map_err(|reason| StorageError::interrupted(target, reason))?
            .map_err(|source| StorageError::WriteFailed {
                uri: target.uri().to_string(),
                source,
            })?;

        info!(uri = %target, bytes = size, "Object written");
        Ok(())
    }
}

/// [`UrlSigner`] over an `object_store` backend that can sign GET URLs
#[derive(Debug)]
pub struct ObjectStoreSigner<S> {
    signer: Arc<S>,
}

impl<S: Signer> ObjectStoreSigner<S> {
    pub fn new(signer: Arc<S>) -> Self {
        Self { signer }
    }
}

#[async_trait]
impl<S: Signer> UrlSigner for ObjectStoreSigner<S> {
    async fn signed_url(
        &self,
        ctx: &RunContext,
        target: &PublishTarget,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let location = object_path(target)?;

        let url = ctx
            .run(
                self.signer
                    .signed_url(reqwest::Method::GET, &location, expires_in),
            )
            .await
            .map_err(|reason| StorageError::interrupted(target, reason))?
            .map_err(|source| StorageError::SigningFailed {
                uri: target.uri().to_string(),
                source,
            })?;

        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use pretty_assertions::assert_eq;
    use url::Url;

    #[derive(Debug)]
    struct FakeSigner;

    #[async_trait]
    impl Signer for FakeSigner {
        async fn signed_url(
            &self,
            method: reqwest::Method,
            path: &ObjectPath,
            expires_in: Duration,
        ) -> object_store::Result<Url> {
            let raw = format!(
                "https://signed.example.com/{path}?method={method}&expires={}",
                expires_in.as_secs()
            );
            Ok(Url::parse(&raw).unwrap())
        }
    }

    #[tokio::test]
    async fn test_write_stores_payload_with_content_type() {
        let store = Arc::new(InMemory::new());
        let writer = ObjectStoreWriter::new(store.clone());
        let target = PublishTarget::parse("gs://reviews/2024/review.html");

        writer
            .write(
                &RunContext::new(),
                &target,
                b"<html></html>".to_vec(),
                "text/html; charset=utf-8",
            )
            .await
            .unwrap();

        let result = store.get(&ObjectPath::from("2024/review.html")).await.unwrap();
        assert_eq!(
            result
                .attributes
                .get(&Attribute::ContentType)
                .map(AsRef::<str>::as_ref),
            Some("text/html; charset=utf-8")
        );
        assert_eq!(result.bytes().await.unwrap().as_ref(), b"<html></html>");
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_object() {
        let store = Arc::new(InMemory::new());
        let writer = ObjectStoreWriter::new(store.clone());
        let target = PublishTarget::parse("s3://reviews/latest.html");
        let ctx = RunContext::new();

        writer.write(&ctx, &target, b"old".to_vec(), "text/plain").await.unwrap();
        writer.write(&ctx, &target, b"new".to_vec(), "text/plain").await.unwrap();

        let bytes = store
            .get(&ObjectPath::from("latest.html"))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), b"new");
    }

    #[tokio::test]
    async fn test_write_rejects_missing_key() {
        let writer = ObjectStoreWriter::new(Arc::new(InMemory::new()));
        let target = PublishTarget::parse("gs://reviews");

        let result = writer
            .write(&RunContext::new(), &target, Vec::new(), "text/plain")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidUri(_))));
    }

    #[tokio::test]
    async fn test_cancelled_write_is_interrupted() {
        let writer = ObjectStoreWriter::new(Arc::new(InMemory::new()));
        let target = PublishTarget::parse("gs://reviews/a.html");
        let ctx = RunContext::new();
        ctx.cancel();

        let result = writer.write(&ctx, &target, b"x".to_vec(), "text/plain").await;
        assert!(matches!(result, Err(StorageError::Interrupted { .. })));
    }

    #[tokio::test]
    async fn test_signer_requests_get_with_expiry() {
        let signer = ObjectStoreSigner::new(Arc::new(FakeSigner));
        let target = PublishTarget::parse("gs://reviews/dir/review.html");

        let url = signer
            .signed_url(&RunContext::new(), &target, Duration::from_secs(1800))
            .await
            .unwrap();

        assert_eq!(
            url,
            "https://signed.example.com/dir/review.html?method=GET&expires=1800"
        );
    }
}
