//! Trait definitions for external dependencies.
//!
//! The download service is composed of two capabilities:
//!
//! - [`PortalApi`] - HTTP access to the portal's `action` and `rest` endpoints
//! - [`Storage`] - directory creation and file writes
//!
//! Both are injected, so the orchestration logic can be tested with in-memory
//! implementations.
//!
//! # Example
//!
//! ```
//! use odufrn_core::traits::PortalApi;
//! use odufrn_core::AppError;
//!
//! // Business logic uses traits, not concrete types
//! async fn count_packages<P: PortalApi>(api: &P) -> Result<usize, AppError> {
//!     Ok(api.fetch_list("package_list").await?.len())
//! }
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::AppError;

/// Read access to an open data portal.
pub trait PortalApi: Send + Sync {
    /// Calls `api/action/{action}` and returns its `result` list.
    ///
    /// # Arguments
    ///
    /// * `action` - Action name, e.g. `package_list`
    fn fetch_list(&self, action: &str) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;

    /// Fetches `api/rest/{rest_path}/{name}` as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns `AppError::EntityNotFound` when the portal answers 404, so a
    /// missing entity can be told apart from transport failures.
    fn fetch_entity(
        &self,
        rest_path: &str,
        name: &str,
    ) -> impl Future<Output = Result<Value, AppError>> + Send;

    /// Downloads the body of an arbitrary URL.
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, AppError>> + Send;
}

/// Local destination for downloaded files.
pub trait Storage: Send + Sync {
    /// Creates the directory and its parents if missing.
    ///
    /// Calling it on an existing directory is a no-op. Returns the path
    /// unchanged for chaining.
    fn ensure_directory(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<PathBuf, AppError>> + Send;

    /// Creates or overwrites a file.
    fn write_file(
        &self,
        path: &Path,
        contents: &[u8],
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Reads a UTF-8 text file.
    fn read_to_string(&self, path: &Path)
    -> impl Future<Output = Result<String, AppError>> + Send;
}
