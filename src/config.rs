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

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP listen address, e.g. "127.0.0.1:8080"
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Shared secret required on mutating requests. Overridable with the
    /// SHELFD_SECRET environment variable or --secret.
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// backend can be "in-memory" or "fs"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// root directory for the fs backend
    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Key prefix everything catalog-related lives under.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Base URL rendered into download links and QR codes.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl CatalogConfig {
    /// Storage key of the JSON index document.
    pub fn index_key(&self) -> String {
        format!("{}/index.json", self.prefix.trim_end_matches('/'))
    }

    /// Storage key prefix for blob objects.
    pub fn blob_prefix(&self) -> String {
        format!("{}/files", self.prefix.trim_end_matches('/'))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_path(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Config {
    pub fn from_path(path: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_backend() -> String {
    "in-memory".to_string()
}

fn default_path() -> String {
    "./data".to_string()
}

fn default_prefix() -> String {
    "shelf".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}
