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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

pub mod index;
pub mod registry;

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Display label shown on the landing and listing pages. Free text,
    /// not unique.
    pub name: String,
    /// Storage key suffix, `<epoch-millis>_<original-name>`, fixed at
    /// upload time.
    pub filename: String,
    pub upload_date: DateTime<Utc>,
    /// At most one entry is expected to carry `true`, but only
    /// [`registry::FileRegistry::select`] normalizes the flag across the
    /// sequence; upload and remove leave siblings untouched, so an index
    /// with zero selected entries is a legitimate state.
    pub selected: bool,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),
    #[error("index write conflicted with a concurrent update")]
    Conflict,
    #[error("corrupt index document: {0}")]
    CorruptIndex(String),
    #[error("internal catalog error: {0}")]
    Internal(String),
    #[error(transparent)]
    Store(#[from] StorageError),
}
