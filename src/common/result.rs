use crate::common::error::ReviewError;

/// Result alias used across the crate
///
/// # Examples
///
/// ```
/// use gitreview::common::result::ReviewResult;
/// use gitreview::common::error::ReviewError;
///
/// fn require_uri(uri: Option<&str>) -> ReviewResult<&str> {
///     uri.ok_or_else(|| ReviewError::config_error("--uri is required"))
/// }
///
/// assert!(require_uri(Some("gs://bucket/key")).is_ok());
/// assert!(require_uri(None).is_err());
/// ```
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Conversion of `Option` into [`ReviewResult`]
pub trait OptionExt<T> {
    /// `None` becomes a configuration error with `message`
    fn ok_or_config_error(self, message: impl Into<String>) -> ReviewResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_config_error(self, message: impl Into<String>) -> ReviewResult<T> {
        self.ok_or_else(|| ReviewError::config_error(message))
    }
}
