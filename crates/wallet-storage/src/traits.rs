//! Storage backend seam.

use crate::StorageResult;

/// Durable string key/value store holding the session tokens.
///
/// Implementations must be safe to share between the request pipeline and
/// whatever front end owns the client.
pub trait SecureStorage: Send + Sync {
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Returns whether the key was present.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Store several entries as one update. Backends that can should make
    /// it all-or-nothing; the default writes them one by one.
    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
