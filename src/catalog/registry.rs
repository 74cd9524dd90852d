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

use crate::catalog::index::IndexRepository;
use crate::catalog::{CatalogError, FileEntry};
use crate::storage::{ObjectMeta, ObjectStore};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;

/// Attempts per index transaction before giving up with
/// [`CatalogError::Conflict`]. Each attempt re-reads the document.
const MAX_CONFLICT_RETRIES: usize = 4;

/// The four catalog mutations plus read access, expressed as
/// read-index / mutate-in-memory / write-index transactions. Blob writes
/// and deletes happen alongside the index transaction, not inside it.
pub struct FileRegistry {
    index: IndexRepository,
    blobs: Arc<dyn ObjectStore>,
    prefix: String,
}

impl FileRegistry {
    pub fn new(
        blobs: Arc<dyn ObjectStore>,
        index: IndexRepository,
        prefix: impl Into<String>,
    ) -> Self {
        let prefix = prefix.into().trim_end_matches('/').to_string();
        Self {
            index,
            blobs,
            prefix,
        }
    }

    /// Storage key for a catalog filename.
    pub fn blob_key(&self, filename: &str) -> String {
        if self.prefix.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", self.prefix, filename)
        }
    }

    /// Runs one index transaction: load, mutate, conditional write,
    /// retried while the write conflicts with a concurrent update.
    async fn with_index<F>(&self, mut mutate: F) -> Result<Vec<FileEntry>, CatalogError>
    where
        F: FnMut(&mut Vec<FileEntry>),
    {
        for attempt in 1..=MAX_CONFLICT_RETRIES {
            let (mut entries, version) = self.index.load().await?;
            mutate(&mut entries);
            match self.index.store(&entries, version).await {
                Ok(()) => return Ok(entries),
                Err(CatalogError::Conflict) => {
                    tracing::debug!(attempt, "index write conflicted, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(CatalogError::Conflict)
    }

    /// Adds a file to the catalog. The blob is written first; if the index
    /// transaction then fails, the blob is deleted best-effort so no
    /// orphan is left behind.
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    pub async fn upload(
        &self,
        data: Bytes,
        original_name: &str,
        display_name: &str,
    ) -> Result<FileEntry, CatalogError> {
        if data.is_empty() {
            return Err(CatalogError::Validation("file is required".into()));
        }
        if original_name.trim().is_empty() {
            return Err(CatalogError::Validation("file name is required".into()));
        }
        if display_name.trim().is_empty() {
            return Err(CatalogError::Validation("display name is required".into()));
        }

        let filename = format!("{}_{}", Utc::now().timestamp_millis(), original_name);
        let key = self.blob_key(&filename);
        self.blobs.put(&key, data).await?;

        let entry = FileEntry {
            name: display_name.to_string(),
            filename: filename.clone(),
            upload_date: Utc::now(),
            selected: false,
        };

        let appended = entry.clone();
        if let Err(e) = self.with_index(|entries| entries.push(appended.clone())).await {
            if let Err(cleanup) = self.blobs.delete(&key).await {
                tracing::warn!(%key, error = %cleanup, "failed to clean up orphaned blob");
            }
            return Err(e);
        }

        tracing::info!(%filename, "uploaded catalog entry");
        Ok(entry)
    }

    /// Drops every entry with this filename and deletes the blob. The
    /// delete is issued regardless of prior existence, so calling this
    /// twice is a safe no-op. Returns the number of entries removed.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, filename: &str) -> Result<usize, CatalogError> {
        let key = self.blob_key(filename);
        self.blobs.delete(&key).await?;

        let mut removed = 0;
        self.with_index(|entries| {
            let before = entries.len();
            entries.retain(|e| e.filename != filename);
            removed = before - entries.len();
        })
        .await?;

        if removed > 0 {
            tracing::info!(%filename, removed, "removed catalog entry");
        }
        Ok(removed)
    }

    /// Overwrites the blob in place. The index is deliberately not
    /// touched: replacing content is a same-identity mutation, not a new
    /// catalog entry.
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    pub async fn replace(&self, filename: &str, data: Bytes) -> Result<(), CatalogError> {
        self.blobs.put(&self.blob_key(filename), data).await?;
        tracing::info!(%filename, "replaced blob content");
        Ok(())
    }

    /// Marks one entry current and unselects every other. A filename that
    /// matches nothing leaves the catalog with no selected entry; that is
    /// accepted, not an error. Returns whether a match was found.
    #[tracing::instrument(skip(self))]
    pub async fn select(&self, filename: &str) -> Result<bool, CatalogError> {
        let mut hit = false;
        self.with_index(|entries| {
            hit = false;
            for e in entries.iter_mut() {
                e.selected = e.filename == filename;
                hit |= e.selected;
            }
        })
        .await?;
        Ok(hit)
    }

    /// Read-only snapshot of the catalog in upload order.
    pub async fn list(&self) -> Result<Vec<FileEntry>, CatalogError> {
        Ok(self.index.load().await?.0)
    }

    /// Blob fetch for downloads. Absent keys are `None`.
    pub async fn open(&self, filename: &str) -> Result<Option<(Bytes, ObjectMeta)>, CatalogError> {
        Ok(self.blobs.get(&self.blob_key(filename)).await?)
    }
}
