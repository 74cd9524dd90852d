use crate::storage::{etag_of, ObjectMeta, ObjectStore, Precondition, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::sync::Mutex;

/// Filesystem-backed object store. Keys map to relative paths under `root`;
/// writes go through a temp file and rename.
///
/// Conditional puts are serialized by an internal mutex, so the precondition
/// guarantee only holds within a single process.
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FsStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| internal("create root", e))?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("key must be non-empty".into()));
        }
        let mut path = self.root.clone();
        for part in key.split('/') {
            if part.is_empty() || part == "." || part == ".." {
                return Err(StorageError::InvalidKey(key.to_string()));
            }
            path.push(part);
        }
        Ok(path)
    }

    async fn read_at(&self, path: &Path) -> Result<Option<(Bytes, ObjectMeta)>, StorageError> {
        match tokio::fs::read(path).await {
            Ok(raw) => {
                let last_modified = tokio::fs::metadata(path)
                    .await
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs() as i64)
                    .unwrap_or_default();
                let data = Bytes::from(raw);
                let meta = ObjectMeta {
                    etag: etag_of(&data),
                    size: data.len() as u64,
                    last_modified_unix_secs: last_modified,
                };
                Ok(Some((data, meta)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(internal("read", e)),
        }
    }

    async fn write_at(&self, path: &Path, data: &Bytes) -> Result<ObjectMeta, StorageError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| internal("create dir", e))?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| internal("write", e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| internal("rename", e))?;

        Ok(ObjectMeta {
            etag: etag_of(data),
            size: data.len() as u64,
            last_modified_unix_secs: chrono::Utc::now().timestamp(),
        })
    }
}

fn internal(what: &str, e: std::io::Error) -> StorageError {
    StorageError::Internal(format!("{what}: {e}"))
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn get(&self, key: &str) -> Result<Option<(Bytes, ObjectMeta)>, StorageError> {
        let path = self.path_for(key)?;
        self.read_at(&path).await
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<ObjectMeta, StorageError> {
        let path = self.path_for(key)?;
        self.write_at(&path, &data).await
    }

    async fn put_if(
        &self,
        key: &str,
        data: Bytes,
        cond: Precondition,
    ) -> Result<ObjectMeta, StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().await;

        let current = self.read_at(&path).await?;
        let holds = match (&cond, &current) {
            (Precondition::Absent, None) => true,
            (Precondition::Tag(tag), Some((_, meta))) => meta.etag == *tag,
            _ => false,
        };
        if !holds {
            return Err(StorageError::PreconditionFailed(key.to_string()));
        }
        self.write_at(&path, &data).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(internal("remove", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn roundtrip_with_nested_key() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path()).await.unwrap();

        let meta = store
            .put("shelf/files/a.pdf", Bytes::from_static(b"content"))
            .await
            .unwrap();
        assert_eq!(meta.size, 7);

        let (data, meta2) = store.get("shelf/files/a.pdf").await.unwrap().unwrap();
        assert_eq!(&data[..], b"content");
        assert_eq!(meta.etag, meta2.etag);

        assert!(store.delete("shelf/files/a.pdf").await.unwrap());
        assert!(!store.delete("shelf/files/a.pdf").await.unwrap());
        assert!(store.get("shelf/files/a.pdf").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn traversal_components_rejected() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path()).await.unwrap();

        for key in ["../escape", "a/../b", "/absolute", "a//b"] {
            let err = store.get(key).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "key {key:?}");
        }
    }

    #[tokio::test]
    async fn put_if_checks_current_etag() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path()).await.unwrap();

        let meta = store.put("doc", Bytes::from_static(b"v1")).await.unwrap();
        store
            .put_if("doc", Bytes::from_static(b"v2"), Precondition::Tag(meta.etag.clone()))
            .await
            .unwrap();

        let err = store
            .put_if("doc", Bytes::from_static(b"v3"), Precondition::Tag(meta.etag))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::PreconditionFailed(_)));
    }
}
