//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use brickhub_core::error::{AppError, ErrorKind};
use brickhub_core::result::AppResult;
use brickhub_core::traits::storage::{StorageObjectMeta, StorageProvider};

/// Local filesystem storage provider.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored files.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path,
    /// creating the directory if needed.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Open an existing directory without creating it.
    ///
    /// Used for read-only trees such as the LDraw parts library, where a
    /// missing directory is a configuration mistake.
    pub async fn open_existing(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        match fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => Ok(Self { root }),
            Ok(_) => Err(AppError::configuration(format!(
                "Not a directory: {}",
                root.display()
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::configuration(
                format!("Directory does not exist: {}", root.display()),
            )),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to open storage root: {}", root.display()),
                e,
            )),
        }
    }

    /// Resolve a relative path to an absolute path within the root.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let clean = Path::new(path.trim_start_matches('/'));
        if clean
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(AppError::validation(format!(
                "Path escapes storage root: {path}"
            )));
        }
        Ok(self.root.join(clean))
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    fn path_prefix(&self) -> Option<&Path> {
        Some(&self.root)
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        if full_path.exists() {
            fs::remove_file(&full_path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete file: {path}"),
                    e,
                )
            })?;
            debug!(path, "Deleted file");
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat path: {path}"),
                e,
            )
        })
    }

    async fn metadata(&self, path: &str) -> AppResult<StorageObjectMeta> {
        let full_path = self.resolve(path)?;
        let meta = fs::metadata(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Path not found: {path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to get metadata: {path}"),
                    e,
                )
            }
        })?;

        Ok(StorageObjectMeta {
            path: path.to_string(),
            size_bytes: meta.len(),
            last_modified: meta.modified().ok().map(chrono::DateTime::<chrono::Utc>::from),
            is_directory: meta.is_dir(),
        })
    }

    async fn list(&self, path: &str) -> AppResult<Vec<StorageObjectMeta>> {
        let full_path = self.resolve(path)?;
        if !full_path.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to list directory: {path}"),
                e,
            )
        })?;

        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let entry_meta = entry.metadata().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to get entry metadata", e)
            })?;

            let name = entry.file_name().to_string_lossy().to_string();
            let entry_path = if path.is_empty() || path == "/" {
                name
            } else {
                format!("{}/{}", path.trim_end_matches('/'), name)
            };

            entries.push(StorageObjectMeta {
                path: entry_path,
                size_bytes: entry_meta.len(),
                last_modified: entry_meta
                    .modified()
                    .ok()
                    .map(chrono::DateTime::<chrono::Utc>::from),
                is_directory: entry_meta.is_dir(),
            });
        }

        entries.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then(a.path.cmp(&b.path))
        });

        Ok(entries)
    }

    async fn create_dir(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        fs::create_dir_all(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory: {path}"),
                e,
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(root: &Path, path: &str, contents: &[u8]) {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, contents).unwrap();
    }

    #[tokio::test]
    async fn test_exists_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path()).await.unwrap();
        seed(dir.path(), "models/3001.stl", b"solid brick");

        assert!(provider.exists("models/3001.stl").await.unwrap());

        provider.delete("models/3001.stl").await.unwrap();
        assert!(!provider.exists("models/3001.stl").await.unwrap());
        assert!(!dir.path().join("models/3001.stl").exists());

        // Deleting a missing file is a no-op.
        provider.delete("models/3001.stl").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_directories_first() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path()).await.unwrap();

        seed(dir.path(), "images/b.png", b"b");
        seed(dir.path(), "images/a.png", b"a");
        provider.create_dir("images/old").await.unwrap();

        let entries = provider.list("images").await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_directory);
        assert_eq!(entries[1].path, "images/a.png");
        assert_eq!(entries[1].size_bytes, 1);
        assert!(entries[1].last_modified.is_some());
        assert_eq!(entries[2].path, "images/b.png");
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path()).await.unwrap();
        assert!(provider.list("models").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_parent_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path()).await.unwrap();
        let err = provider.exists("../etc/passwd").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_open_existing_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("ldraw");
        let err = LocalStorageProvider::open_existing(&missing)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);

        std::fs::create_dir(&missing).unwrap();
        let provider = LocalStorageProvider::open_existing(&missing).await.unwrap();
        assert_eq!(provider.path_prefix(), Some(missing.as_path()));
    }

    #[tokio::test]
    async fn test_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path()).await.unwrap();
        seed(dir.path(), "models/3001.stl", b"0123456789");

        let meta = provider.metadata("models/3001.stl").await.unwrap();
        assert_eq!(meta.size_bytes, 10);
        assert!(!meta.is_directory);
        assert!(meta.last_modified.is_some());

        let err = provider.metadata("models/none.stl").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
