//! Authentication seam.
//!
//! Credential storage and the token handshake live outside this crate; the
//! pipeline only needs a bearer token on demand.

use async_trait::async_trait;

use crate::error::AuthError;

/// Supplies bearer tokens for the analytics API.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Obtain a bearer token for the given account identity.
    ///
    /// [`AuthError::Unavailable`] is treated as transient and retried with
    /// backoff; the other variants abort the run immediately.
    async fn bearer_token(&self, account: &str) -> Result<String, AuthError>;
}

#[async_trait]
impl<T: AuthProvider + ?Sized> AuthProvider for std::sync::Arc<T> {
    async fn bearer_token(&self, account: &str) -> Result<String, AuthError> {
        (**self).bearer_token(account).await
    }
}
