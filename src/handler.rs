use crate::auth::Authorizer;
use crate::catalog::registry::FileRegistry;
use std::sync::Arc;

/// Shared components handed to every request handler.
#[derive(Clone)]
pub struct Handler {
    pub auth: Arc<dyn Authorizer>,
    pub registry: Arc<FileRegistry>,
}

impl Handler {
    pub fn new(auth: Arc<dyn Authorizer>, registry: Arc<FileRegistry>) -> Self {
        Self { auth, registry }
    }
}
