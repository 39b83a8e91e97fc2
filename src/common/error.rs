use crate::application::use_cases::publish_review::PublishError;
use crate::application::use_cases::review_pipeline::PipelineError;
use crate::infrastructure::storage::StorageError;
use thiserror::Error;

/// Crate-wide error returned by the command handlers
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl ReviewError {
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the run stopped because it was cancelled or timed out
    pub fn is_interrupted(&self) -> bool {
        match self {
            Self::Pipeline(e) => e.is_interrupted(),
            Self::Storage(StorageError::Interrupted { .. }) => true,
            Self::Publish(PublishError::Storage {
                source: StorageError::Interrupted { .. },
                ..
            }) => true,
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for ReviewError {
    fn from(error: validator::ValidationErrors) -> Self {
        Self::config_error_with_source(format!("Invalid review configuration: {error}"), error)
    }
}
