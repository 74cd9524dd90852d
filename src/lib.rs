pub mod auth;
pub mod catalog;
pub mod config;
pub mod handler;
pub mod http;
pub mod observability;
pub mod server;
pub mod storage;

pub use auth::Authorizer;
pub use catalog::registry::FileRegistry;
pub use catalog::FileEntry;
pub use handler::Handler;
pub use http::CatalogHttp;
pub use storage::{ObjectMeta, ObjectStore};
