//! Object storage for published review artifacts

pub mod html;
pub mod object_store_writer;
pub mod storage_factory;
pub mod storage_interface;

pub use html::{render_review_document, DEFAULT_CONTENT_TYPE};
pub use object_store_writer::{ObjectStoreSigner, ObjectStoreWriter};
pub use storage_factory::StorageFactory;
pub use storage_interface::{
    StorageBackend, StorageError, StorageProvider, StorageWriter, UrlSigner,
};
