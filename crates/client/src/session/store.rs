//! Credential persistence
//!
//! Persistence is a black box to the client layer: the embedding
//! application decides where credentials live (keychain, encrypted file,
//! nothing at all). The in-memory store is the default and the test
//! implementation.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::credentials::SessionCredentials;

/// Error raised by a credential store backend
#[derive(Debug, Clone, Error)]
#[error("credential store error: {0}")]
pub struct StoreError(pub String);

/// Persisted credential storage supplied by the embedding application
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load previously persisted credentials, if any
    async fn load(&self) -> Result<Option<SessionCredentials>, StoreError>;

    /// Persist the given credentials, replacing any previous value
    async fn save(&self, credentials: &SessionCredentials) -> Result<(), StoreError>;

    /// Remove persisted credentials
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Volatile store; credentials live only as long as the process
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Option<SessionCredentials>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<Option<SessionCredentials>, StoreError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, credentials: &SessionCredentials) -> Result<(), StoreError> {
        *self.inner.write().await = Some(credentials.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.inner.write().await = None;
        Ok(())
    }
}
