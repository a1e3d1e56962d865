//! Secure secret store boundary.
//!
//! Sensitive blobs (mnemonic words, key material) never live in the
//! relational schema; tables only hold opaque string keys into this store.
//! Migration steps receive the store as an injected capability so the
//! storage core can be exercised against [`MemorySecretStore`] in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;

use crate::error::StorageError;

/// Narrow contract over an external secret-keyed blob store.
///
/// Absence of a key is a valid state, not an error: `get` returns `Ok(None)`
/// and `remove` of a missing key succeeds.
pub trait SecretStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Secret store backed by the OS keychain.
///
/// The keychain holds strings, so blob values are base64-encoded on the way
/// in and decoded on the way out.
pub struct KeychainSecretStore {
    service: String,
}

impl KeychainSecretStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, StorageError> {
        keyring::Entry::new(&self.service, key)
            .map_err(|e| StorageError::SecretStore(format!("keychain entry '{key}': {e}")))
    }
}

impl SecretStore for KeychainSecretStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(encoded) => {
                let bytes = B64.decode(&encoded).map_err(|e| {
                    StorageError::SecretStore(format!("stored value for '{key}' is not base64: {e}"))
                })?;
                Ok(Some(bytes))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::SecretStore(format!(
                "keychain read '{key}': {e}"
            ))),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entry(key)?
            .set_password(&B64.encode(value))
            .map_err(|e| StorageError::SecretStore(format!("keychain write '{key}': {e}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::SecretStore(format!(
                "keychain delete '{key}': {e}"
            ))),
        }
    }
}

/// In-memory secret store for tests and embedded use.
#[derive(Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a key, e.g. a legacy blob a migration step should pick up.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries
            .lock()
            .expect("secret store lock poisoned")
            .insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .expect("secret store lock poisoned")
            .contains_key(key)
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .entries
            .lock()
            .expect("secret store lock poisoned")
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries
            .lock()
            .expect("secret store lock poisoned")
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .expect("secret store lock poisoned")
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySecretStore::new();

        // Missing key is None, not an error
        assert_eq!(store.get("words").unwrap(), None);

        store.set("words", b"alpha,beta").unwrap();
        assert_eq!(store.get("words").unwrap(), Some(b"alpha,beta".to_vec()));

        store.remove("words").unwrap();
        assert_eq!(store.get("words").unwrap(), None);

        // Removing a missing key succeeds
        store.remove("words").unwrap();
    }
}
