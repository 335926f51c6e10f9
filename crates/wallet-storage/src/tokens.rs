//! High-level API for the persisted token pair.

use crate::{MemoryStorage, SecureStorage, StorageKeys, StorageResult};
use std::fmt;

/// Access and refresh token as issued by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .finish()
    }
}

/// Reads and writes the token pair under fixed keys.
pub struct TokenVault {
    storage: Box<dyn SecureStorage>,
}

impl TokenVault {
    /// Create a new vault over the given storage backend
    pub fn new(storage: Box<dyn SecureStorage>) -> Self {
        Self { storage }
    }

    /// Vault backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    pub fn access_token(&self) -> StorageResult<Option<String>> {
        self.non_empty(StorageKeys::ACCESS_TOKEN)
    }

    pub fn set_access_token(&self, token: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::ACCESS_TOKEN, token)
    }

    pub fn refresh_token(&self) -> StorageResult<Option<String>> {
        self.non_empty(StorageKeys::REFRESH_TOKEN)
    }

    pub fn set_refresh_token(&self, token: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::REFRESH_TOKEN, token)
    }

    /// Persist both tokens in one storage update, so a failure never leaves
    /// a new access token next to a rotated-out refresh token.
    pub fn set_token_pair(&self, pair: &TokenPair) -> StorageResult<()> {
        self.storage.set_many(&[
            (StorageKeys::ACCESS_TOKEN, pair.access_token.as_str()),
            (StorageKeys::REFRESH_TOKEN, pair.refresh_token.as_str()),
        ])?;
        tracing::debug!("Stored token pair");
        Ok(())
    }

    /// Load the persisted pair. A missing or empty entry on either side
    /// means there is no session.
    pub fn load_token_pair(&self) -> StorageResult<Option<TokenPair>> {
        match (self.access_token()?, self.refresh_token()?) {
            (Some(access_token), Some(refresh_token)) => Ok(Some(TokenPair {
                access_token,
                refresh_token,
            })),
            _ => Ok(None),
        }
    }

    pub fn has_session(&self) -> StorageResult<bool> {
        Ok(self.load_token_pair()?.is_some())
    }

    /// Remove both tokens. Both deletes are attempted even if the first fails.
    pub fn clear(&self) -> StorageResult<()> {
        let access = self.storage.delete(StorageKeys::ACCESS_TOKEN);
        let refresh = self.storage.delete(StorageKeys::REFRESH_TOKEN);
        access?;
        refresh?;
        tracing::debug!("Cleared token pair");
        Ok(())
    }

    fn non_empty(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.storage.get(key)?.filter(|value| !value.is_empty()))
    }
}
