use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod fs_store;
pub mod in_memory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub etag: String,
    pub size: u64,
    pub last_modified_unix_secs: i64,
}

/// Guard for conditional writes. `Absent` requires the key to not exist,
/// `Tag` requires the stored object's etag to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    Absent,
    Tag(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("internal storage error: {0}")]
    Internal(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Fetches an object. An absent key is `None`, not an error.
    async fn get(&self, key: &str) -> Result<Option<(Bytes, ObjectMeta)>, StorageError>;

    /// Unconditional overwrite.
    async fn put(&self, key: &str, data: Bytes) -> Result<ObjectMeta, StorageError>;

    /// Conditional overwrite. Fails with [`StorageError::PreconditionFailed`]
    /// when the guard does not hold at write time.
    async fn put_if(
        &self,
        key: &str,
        data: Bytes,
        cond: Precondition,
    ) -> Result<ObjectMeta, StorageError>;

    /// Deletes an object. Returns whether the key existed; deleting an
    /// absent key is not an error.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

pub(crate) fn etag_of(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key must be non-empty".into()));
    }
    Ok(())
}
