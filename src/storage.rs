// src/storage.rs
use crate::error::StorageError;
use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Bucket/key blob storage used for the position list and snapshots.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;
}

/// Stores every object as `<root>/<bucket>/<key>`.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        FsObjectStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_of(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_of(bucket, key);
        match fs::read(&path).await {
            Ok(bytes) => {
                debug!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let path = self.path_of(bucket, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        store
            .put("stocks", "reports/2024/3/result.json", b"{}".to_vec())
            .await
            .unwrap();

        let bytes = store.get("stocks", "reports/2024/3/result.json").await.unwrap();
        assert_eq!(bytes, b"{}");
        assert!(dir.path().join("stocks/reports/2024/3/result.json").exists());
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        let err = store.get("stocks", "nope.csv").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }
}
