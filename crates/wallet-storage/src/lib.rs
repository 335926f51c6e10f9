//! Durable token storage for the wallet client.
//!
//! Tokens are kept in a single JSON file (`~/.wallet/credentials.json`,
//! mode 0600 on unix) via [`FileStorage`]. [`MemoryStorage`] backs tests and
//! ephemeral sessions. [`TokenVault`] is the typed layer the session store
//! talks to.

mod file;
mod keys;
mod memory;
mod tokens;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use tokens::{TokenPair, TokenVault};
pub use traits::SecureStorage;

use std::path::PathBuf;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create a TokenVault persisted at `path`.
pub fn open_vault(path: impl Into<PathBuf>) -> TokenVault {
    TokenVault::new(Box::new(FileStorage::new(path)))
}
