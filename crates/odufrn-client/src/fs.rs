//! Local filesystem storage backed by `tokio::fs`.

use std::path::{Path, PathBuf};

use odufrn_core::error::AppError;
use odufrn_core::traits::Storage;

/// Writes downloads to the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl Storage for LocalStorage {
    async fn ensure_directory(&self, path: &Path) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| AppError::filesystem(path, e))?;
        Ok(path.to_path_buf())
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), AppError> {
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| AppError::filesystem(path, e))?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "File written");
        Ok(())
    }

    async fn read_to_string(&self, path: &Path) -> Result<String, AppError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::filesystem(path, e))
    }
}
