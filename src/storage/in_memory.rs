use crate::storage::{etag_of, validate_key, ObjectMeta, ObjectStore, Precondition, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    meta: ObjectMeta,
}

/// In-memory object store.
///
/// BTreeMap gives deterministic iteration order (useful for tests). The
/// single write lock makes `put_if` atomic within the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored key. Test and debugging helper.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

fn make_object(data: Bytes) -> StoredObject {
    let meta = ObjectMeta {
        etag: etag_of(&data),
        size: data.len() as u64,
        last_modified_unix_secs: Utc::now().timestamp(),
    };
    StoredObject { data, meta }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<(Bytes, ObjectMeta)>, StorageError> {
        validate_key(key)?;
        let objs = self.objects.read().await;
        Ok(objs.get(key).map(|o| (o.data.clone(), o.meta.clone())))
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<ObjectMeta, StorageError> {
        validate_key(key)?;
        let obj = make_object(data);
        let meta = obj.meta.clone();
        self.objects.write().await.insert(key.to_string(), obj);
        Ok(meta)
    }

    async fn put_if(
        &self,
        key: &str,
        data: Bytes,
        cond: Precondition,
    ) -> Result<ObjectMeta, StorageError> {
        validate_key(key)?;
        let mut objs = self.objects.write().await;
        let holds = match (&cond, objs.get(key)) {
            (Precondition::Absent, None) => true,
            (Precondition::Tag(tag), Some(current)) => current.meta.etag == *tag,
            _ => false,
        };
        if !holds {
            return Err(StorageError::PreconditionFailed(key.to_string()));
        }
        let obj = make_object(data);
        let meta = obj.meta.clone();
        objs.insert(key.to_string(), obj);
        Ok(meta)
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        Ok(self.objects.write().await.remove(key).is_some())
    }
}
