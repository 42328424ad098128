use std::path::PathBuf;

use thiserror::Error;

use crate::models::EntityKind;

/// Hint appended to user-facing messages for failed downloads.
pub const DOWNLOAD_FAILURE_HINT: &str =
    "Check your connection and the dataset name, then try again.";

/// Application-wide error types.
///
/// This enum represents all possible errors that can occur while talking to
/// the portal or writing datasets to disk. It uses the `thiserror` crate for
/// ergonomic error handling.
///
/// # Error Conversion
///
/// - `serde_json::Error` → `AppError::SerializationError` (via `#[from]`)
/// - HTTP client errors are classified by the client into `NetworkError`,
///   `Timeout` or `ClientError`
/// - I/O errors carry the offending path in `FilesystemError`
///
/// # Examples
///
/// ```
/// use odufrn_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::EntityNotFound("dataset/discentes".to_string()))
/// }
///
/// assert!(example().is_err());
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Name is not present in the cached catalog.
    ///
    /// Raised before any entity request is made. The catalog is not refreshed
    /// on a miss; call the matching `reload_*` method first if it may be stale.
    #[error("{kind} not found in catalog: {name}")]
    NotInCatalog { kind: EntityKind, name: String },

    /// The portal answered 404 for an entity endpoint.
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// HTTP client request failed.
    ///
    /// This error occurs when the portal answers with an unexpected status or
    /// reports `success: false`, or when the request fails for a reason that
    /// is neither a timeout nor a connection failure.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// Network or connection error.
    ///
    /// This error occurs when a network request fails due to connectivity issues,
    /// DNS resolution failures, or the remote server being unreachable.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout.
    ///
    /// Only possible when a timeout has been configured.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// JSON deserialization failed or the payload had an unexpected shape.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A directory could not be created or a file could not be read or written.
    #[error("Filesystem error at {}: {source}", path.display())]
    FilesystemError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// URL parsing failed.
    ///
    /// This error occurs when a resource URL published by the portal cannot be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid portal base URL provided.
    #[error("Invalid portal URL: {0}")]
    InvalidPortalUrl(String),

    /// Configuration file error.
    ///
    /// This error occurs when reading or parsing the configuration file fails.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Wraps an I/O error together with the path it happened on.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::FilesystemError {
            path: path.into(),
            source,
        }
    }

    /// Returns true for both "absent from catalog" and "portal answered 404".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotInCatalog { .. } | AppError::EntityNotFound(_)
        )
    }

    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotInCatalog { kind, name } => {
                format!(
                    "The {} \"{}\" was not found.\n   Try: odufrn list {}s",
                    kind, name, kind
                )
            }
            AppError::EntityNotFound(what) => {
                format!("The portal has no entry for \"{}\".", what)
            }
            AppError::ClientError(msg) => {
                format!(
                    "An error occurred while downloading: {}\n   {}",
                    msg, DOWNLOAD_FAILURE_HINT
                )
            }
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   {}", msg, DOWNLOAD_FAILURE_HINT)
            }
            AppError::Timeout(secs) => {
                format!(
                    "Request timed out after {} seconds.\n   {}",
                    secs, DOWNLOAD_FAILURE_HINT
                )
            }
            AppError::SerializationError(e) => {
                format!(
                    "The portal returned an unexpected response: {}\n   {}",
                    e, DOWNLOAD_FAILURE_HINT
                )
            }
            AppError::FilesystemError { path, source } => {
                format!(
                    "Cannot write to {}: {}\n   Check the destination directory permissions.",
                    path.display(),
                    source
                )
            }
            AppError::InvalidPortalUrl(url) => {
                format!("Invalid portal URL: {}\n   Example: http://dados.ufrn.br", url)
            }
            AppError::ConfigError(msg) => {
                format!(
                    "Configuration error: {}\n   Check your configuration file.",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }
}
