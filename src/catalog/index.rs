// Copyright PingCAP Inc. 2025.
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; version 2 of the License.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use crate::catalog::{CatalogError, FileEntry};
use crate::storage::{ObjectStore, Precondition, StorageError};
use bytes::Bytes;
use std::sync::Arc;

/// Version token for the index document. Returned by
/// [`IndexRepository::load`] and required by [`IndexRepository::store`];
/// a stale token makes the write fail with [`CatalogError::Conflict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexVersion {
    /// No index document exists yet (first-use bootstrap).
    Empty,
    /// Etag of the document as read.
    Tag(String),
}

/// Reads and writes the single JSON index document. Every call is a
/// full-document round trip; there are no partial updates.
pub struct IndexRepository {
    store: Arc<dyn ObjectStore>,
    key: String,
}

impl IndexRepository {
    pub fn new(store: Arc<dyn ObjectStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Fetches the index. An absent document is an empty catalog, not an
    /// error.
    pub async fn load(&self) -> Result<(Vec<FileEntry>, IndexVersion), CatalogError> {
        match self.store.get(&self.key).await? {
            None => Ok((Vec::new(), IndexVersion::Empty)),
            Some((data, meta)) => {
                let entries = serde_json::from_slice(&data)
                    .map_err(|e| CatalogError::CorruptIndex(e.to_string()))?;
                Ok((entries, IndexVersion::Tag(meta.etag)))
            }
        }
    }

    /// Serializes the full sequence and writes it back, guarded by the
    /// version obtained from the prior [`load`](Self::load).
    pub async fn store(
        &self,
        entries: &[FileEntry],
        version: IndexVersion,
    ) -> Result<(), CatalogError> {
        let body =
            serde_json::to_vec(entries).map_err(|e| CatalogError::Internal(e.to_string()))?;
        let cond = match version {
            IndexVersion::Empty => Precondition::Absent,
            IndexVersion::Tag(tag) => Precondition::Tag(tag),
        };
        match self.store.put_if(&self.key, Bytes::from(body), cond).await {
            Ok(_) => Ok(()),
            Err(StorageError::PreconditionFailed(_)) => Err(CatalogError::Conflict),
            Err(e) => Err(e.into()),
        }
    }
}
