// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{MirrorError, Result};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

/// Filesystem side of the mirror
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    /// Permission bits applied to every written file
    file_mode: Option<u32>,
}

impl FileStore {
    pub fn new(file_mode: Option<u32>) -> Self {
        Self { file_mode }
    }

    /// Write `bytes` to `directory/filename` unless the file already holds them.
    ///
    /// Returns whether the file content changed. Failing to apply the file
    /// mode is logged and does not hide a completed write.
    pub async fn put(&self, directory: &Path, filename: &str, bytes: &[u8]) -> Result<bool> {
        fs::create_dir_all(directory)
            .await
            .map_err(|source| MirrorError::DirectoryError {
                path: directory.to_path_buf(),
                source,
            })?;

        let path = directory.join(filename);
        let changed = match fs::read(&path).await {
            Ok(existing) if existing == bytes => {
                debug!("{} is up to date", path.display());
                false
            }
            _ => {
                fs::write(&path, bytes)
                    .await
                    .map_err(|source| MirrorError::WriteError {
                        path: path.clone(),
                        source,
                    })?;
                info!("Wrote {}", path.display());
                true
            }
        };

        if let Some(mode) = self.file_mode {
            if let Err(e) = set_mode(&path, mode).await {
                warn!("{}, keeping the written content", e);
            }
        }

        Ok(changed)
    }

    /// Delete `directory/filename` if present, returning whether it existed
    pub async fn remove(&self, directory: &Path, filename: &str) -> Result<bool> {
        let path = directory.join(filename);
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Removed {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("{} not found, nothing to remove", path.display());
                Ok(false)
            }
            Err(source) => Err(MirrorError::RemoveError { path, source }),
        }
    }
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .map_err(|source| MirrorError::PermissionError {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(not(unix))]
async fn set_mode(path: &Path, _mode: u32) -> Result<()> {
    debug!("File modes are not supported here, leaving {} as is", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_creates_directory_and_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested/out");
        let store = FileStore::default();

        let changed = store.put(&dir, "settings.yaml", b"a: 1").await.unwrap();

        assert!(changed);
        assert_eq!(std::fs::read(dir.join("settings.yaml")).unwrap(), b"a: 1");
    }

    #[tokio::test]
    async fn test_put_identical_content_reports_no_change() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::default();

        assert!(store.put(tmp.path(), "f", b"same").await.unwrap());
        assert!(!store.put(tmp.path(), "f", b"same").await.unwrap());
        assert!(store.put(tmp.path(), "f", b"different").await.unwrap());
        assert_eq!(std::fs::read(tmp.path().join("f")).unwrap(), b"different");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_put_applies_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(Some(0o600));

        store.put(tmp.path(), "secret", b"s3cr3t").await.unwrap();

        let mode = std::fs::metadata(tmp.path().join("secret"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    // Files under /proc/<pid> refuse mode changes, even for root
    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_put_reports_change_when_file_mode_cannot_be_applied() {
        let dir = Path::new("/proc/self");
        let current = std::fs::read_to_string(dir.join("oom_score_adj")).unwrap();
        let store = FileStore::new(Some(0o644));

        let changed = store
            .put(dir, "oom_score_adj", current.trim().as_bytes())
            .await
            .unwrap();

        assert!(changed);
    }

    #[tokio::test]
    async fn test_put_fails_when_directory_cannot_be_created() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let store = FileStore::default();

        let err = store.put(&blocker.join("sub"), "f", b"x").await.unwrap_err();

        assert!(matches!(err, MirrorError::DirectoryError { .. }));
    }

    #[tokio::test]
    async fn test_remove_existing_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("f"), b"x").unwrap();
        let store = FileStore::default();

        assert!(store.remove(tmp.path(), "f").await.unwrap());
        assert!(!tmp.path().join("f").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::default();

        assert!(!store.remove(tmp.path(), "never-written").await.unwrap());
    }
}
