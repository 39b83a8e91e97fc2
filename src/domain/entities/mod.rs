pub mod repository;
pub mod review;

pub use repository::{RepositoryHandle, RepositoryState};
pub use review::{DiffResult, ReviewArtifact, ReviewConfig, ReviewMode, ReviewModeError};
