use async_trait::async_trait;
use thiserror::Error;

pub mod static_secret;

/// Header carrying the caller's credential on mutating requests.
pub const AUTH_HEADER: &str = "x-auth-bearer";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Gate in front of every mutating operation. Read-only catalog views do
/// not pass through here.
#[async_trait]
pub trait Authorizer: Send + Sync + 'static {
    async fn authorize(&self, credential: Option<&str>) -> Result<(), AuthError>;
}
