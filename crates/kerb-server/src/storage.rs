//! Filesystem storage for uploaded banner images.
//!
//! Uploaded blobs are written under a single configured directory with
//! collision-resistant names (random UUID plus the original extension).
//! Deletion resolves only bare file names, never paths, so a hostile
//! identifier cannot reach outside the upload directory.

use std::path::{Path, PathBuf};

use kerb_core::{Error, Result};
use uuid::Uuid;

/// Return the bare file name if `name` is safe to resolve inside the upload
/// directory, or `None` when it contains path separators or parent segments.
pub fn safe_file_name(name: &str) -> Option<&str> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return None;
    }
    Some(name)
}

/// Filesystem manager for the banner upload directory.
pub struct BannerStorage {
    dir: PathBuf,
}

impl BannerStorage {
    /// Create a new `BannerStorage` rooted at the given directory.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// The upload directory root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// The filesystem path a stored file name resolves to.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Persist an uploaded blob under a fresh collision-resistant name.
    ///
    /// Returns the generated storage file name (`{uuid}.{extension}`).
    pub async fn save(&self, extension: &str, data: &[u8]) -> Result<String> {
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.path_for(&file_name);

        tokio::fs::write(&path, data).await.map_err(|e| {
            Error::Internal(format!("Failed to write {}: {e}", path.display()))
        })?;

        Ok(file_name)
    }

    /// Delete a stored file by its bare file name.
    ///
    /// Rejects any name that could resolve outside the upload directory.
    pub async fn delete(&self, file_name: &str) -> Result<()> {
        let name = safe_file_name(file_name)
            .ok_or_else(|| Error::Validation(format!("invalid file name: {file_name}")))?;

        let path = self.path_for(name);
        tokio::fs::remove_file(&path).await.map_err(|e| {
            Error::Internal(format!("Failed to delete {}: {e}", path.display()))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> (tempfile::TempDir, BannerStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = BannerStorage::new(dir.path().to_path_buf());
        (dir, storage)
    }

    #[test]
    fn safe_file_name_accepts_plain_names() {
        assert_eq!(safe_file_name("banner.jpg"), Some("banner.jpg"));
        assert_eq!(safe_file_name("a-b_c.png"), Some("a-b_c.png"));
    }

    #[test]
    fn safe_file_name_rejects_traversal() {
        assert_eq!(safe_file_name(".."), None);
        assert_eq!(safe_file_name("../secret.jpg"), None);
        assert_eq!(safe_file_name("a/b.jpg"), None);
        assert_eq!(safe_file_name("a\\b.jpg"), None);
        assert_eq!(safe_file_name(""), None);
        assert_eq!(safe_file_name("."), None);
    }

    #[tokio::test]
    async fn save_writes_file_with_extension() {
        let (_dir, storage) = storage();
        storage.ensure_dir().unwrap();

        let name = storage.save("jpg", b"fake jpeg data").await.unwrap();
        assert!(name.ends_with(".jpg"));

        let written = std::fs::read(storage.path_for(&name)).unwrap();
        assert_eq!(written, b"fake jpeg data");
    }

    #[tokio::test]
    async fn save_generates_unique_names() {
        let (_dir, storage) = storage();
        storage.ensure_dir().unwrap();

        let a = storage.save("png", b"one").await.unwrap();
        let b = storage.save("png", b"two").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let (_dir, storage) = storage();
        storage.ensure_dir().unwrap();

        let name = storage.save("gif", b"gif data").await.unwrap();
        assert!(storage.path_for(&name).exists());

        storage.delete(&name).await.unwrap();
        assert!(!storage.path_for(&name).exists());
    }

    #[tokio::test]
    async fn delete_missing_file_errors() {
        let (_dir, storage) = storage();
        storage.ensure_dir().unwrap();

        assert!(storage.delete("nope.jpg").await.is_err());
    }

    #[tokio::test]
    async fn delete_rejects_traversal_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("secret.jpg");
        std::fs::write(&outside, b"keep me").unwrap();

        let upload_dir = dir.path().join("uploads");
        let storage = BannerStorage::new(upload_dir);
        storage.ensure_dir().unwrap();

        let err = storage.delete("../secret.jpg").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(outside.exists());
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let (_dir, storage) = storage();
        storage.ensure_dir().unwrap();
        storage.ensure_dir().unwrap();
        assert!(storage.dir().exists());
    }
}
