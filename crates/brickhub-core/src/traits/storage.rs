//! Storage provider trait for the filesystems the converter caches on.

use std::path::Path;

use async_trait::async_trait;

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StorageObjectMeta {
    /// Path within the storage provider.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modified timestamp.
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
    /// Whether this is a directory.
    pub is_directory: bool,
}

/// Trait for file storage backends.
///
/// Paths are relative to the provider root and use `/` as separator.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Absolute directory backing this provider, if it lives on the local
    /// filesystem. External renderers can only read from and write to
    /// providers that return `Some`.
    fn path_prefix(&self) -> Option<&Path>;

    /// Delete a file at the given path.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether a file or directory exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Get metadata about a file or directory.
    async fn metadata(&self, path: &str) -> AppResult<StorageObjectMeta>;

    /// List the contents of a directory.
    async fn list(&self, path: &str) -> AppResult<Vec<StorageObjectMeta>>;

    /// Create a directory (and any missing parents).
    async fn create_dir(&self, path: &str) -> AppResult<()>;
}
