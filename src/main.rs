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

use clap::Parser;
use shelfd::auth::static_secret::StaticSecretAuthorizer;
use shelfd::auth::Authorizer;
use shelfd::catalog::index::IndexRepository;
use shelfd::catalog::registry::FileRegistry;
use shelfd::config::Config;
use shelfd::handler::Handler;
use shelfd::http::{CatalogHttp, SiteContext};
use shelfd::observability::tracing_setup;
use shelfd::storage::fs_store::FsStore;
use shelfd::storage::in_memory::InMemoryStore;
use shelfd::storage::ObjectStore;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "shelfd")]
#[command(about = "Selectable file catalog backed by object storage", long_about = None)]
struct Args {
    /// Address to listen on (e.g., 0.0.0.0:8080)
    #[arg(short, long)]
    listen: Option<String>,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Shared secret for mutating requests (overrides config and SHELFD_SECRET)
    #[arg(long)]
    secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_setup::init_tracing_from_env();

    let args = Args::parse();

    let cfg = if std::path::Path::new(&args.config).exists() {
        Config::from_path(&args.config)?
    } else {
        Config::default()
    };

    // Command line args override config file
    let addr: SocketAddr = args.listen.as_ref().unwrap_or(&cfg.listen_addr).parse()?;

    let secret = args
        .secret
        .or_else(|| std::env::var("SHELFD_SECRET").ok())
        .unwrap_or_else(|| cfg.auth.secret.clone());
    if secret.is_empty() {
        return Err(
            "auth secret is not configured (set [auth] secret, SHELFD_SECRET, or --secret)".into(),
        );
    }
    let auth: Arc<dyn Authorizer> = Arc::new(StaticSecretAuthorizer::new(secret));

    let store: Arc<dyn ObjectStore> = match cfg.storage.backend.as_str() {
        "fs" => Arc::new(FsStore::new(&cfg.storage.path).await?),
        "in-memory" => Arc::new(InMemoryStore::new()),
        other => return Err(format!("unknown storage backend: {other}").into()),
    };
    tracing::info!(backend = %cfg.storage.backend, "storage initialized");

    let index = IndexRepository::new(store.clone(), cfg.catalog.index_key());
    let registry = Arc::new(FileRegistry::new(store, index, cfg.catalog.blob_prefix()));

    let handler = Handler::new(auth, registry);
    let site = SiteContext {
        public_base_url: cfg.catalog.public_base_url.clone(),
    };
    let app = CatalogHttp::new_with_context(handler, site).router();

    shelfd::server::serve(addr, app).await?;
    Ok(())
}
