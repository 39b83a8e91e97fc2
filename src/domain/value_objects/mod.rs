pub mod git_url;
pub mod storage_uri;

pub use git_url::{
    default_local_path, normalize_remote_url, repository_path, sanitize_for_path,
    DEFAULT_CLONE_ROOT,
};
pub use storage_uri::{PublishTarget, StorageScheme, StorageUriError, DEFAULT_AWS_REGION};
