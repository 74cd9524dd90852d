use crate::auth::{AuthError, Authorizer};
use async_trait::async_trait;
use std::fmt;
use subtle::ConstantTimeEq;

/// Authorizer backed by a single process-wide secret configured at
/// deployment time. Comparison is constant-time; slices of different
/// lengths compare unequal without leaking where they diverge.
#[derive(Clone)]
pub struct StaticSecretAuthorizer {
    secret: String,
}

impl StaticSecretAuthorizer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for StaticSecretAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSecretAuthorizer").finish_non_exhaustive()
    }
}

#[async_trait]
impl Authorizer for StaticSecretAuthorizer {
    async fn authorize(&self, credential: Option<&str>) -> Result<(), AuthError> {
        let supplied = credential.ok_or(AuthError::MissingCredentials)?;
        if bool::from(supplied.as_bytes().ct_eq(self.secret.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn matching_secret_passes() {
        let auth = StaticSecretAuthorizer::new("hunter2");
        auth.authorize(Some("hunter2")).await.unwrap();
    }

    #[tokio::test]
    async fn wrong_secret_rejected() {
        let auth = StaticSecretAuthorizer::new("hunter2");
        let err = auth.authorize(Some("hunter3")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn length_mismatch_rejected() {
        let auth = StaticSecretAuthorizer::new("hunter2");
        let err = auth.authorize(Some("hunter")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn missing_credential_rejected() {
        let auth = StaticSecretAuthorizer::new("hunter2");
        let err = auth.authorize(None).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let auth = StaticSecretAuthorizer::new("hunter2");
        assert!(!format!("{auth:?}").contains("hunter2"));
    }
}
