//! Session token persistence
//!
//! Tokens live in two named slots of a pluggable key/value storage. Reads are
//! public; only login, logout and the refresh guard write.

use medibook_core::types::AuthTokens;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("failed to write {key}: {message}")]
    Write { key: String, message: String },

    #[error("failed to remove {key}: {message}")]
    Remove { key: String, message: String },
}

impl StorageError {
    pub fn write(key: &str, err: impl std::fmt::Display) -> Self {
        Self::Write {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    pub fn remove(key: &str, err: impl std::fmt::Display) -> Self {
        Self::Remove {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

/// Key/value backend for token slots
#[cfg_attr(test, mockall::automock)]
pub trait TokenStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Access/refresh token pair over a [`TokenStorage`]
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn TokenStorage>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_access_token", &self.access_token().is_some())
            .field("has_refresh_token", &self.refresh_token().is_some())
            .finish()
    }
}

impl TokenStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Whether a session can be resumed without logging in
    pub fn has_session(&self) -> bool {
        self.access_token().is_some()
    }

    fn read(&self, key: &str) -> Option<String> {
        self.storage
            .get_item(key)
            .filter(|value| !value.is_empty())
    }

    pub(crate) fn store(&self, tokens: &AuthTokens) -> Result<(), StorageError> {
        self.storage
            .set_item(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        self.storage
            .set_item(REFRESH_TOKEN_KEY, &tokens.refresh_token)
    }

    /// Remove both slots; the second removal runs even if the first fails
    pub(crate) fn clear(&self) -> Result<(), StorageError> {
        let access = self.storage.remove_item(ACCESS_TOKEN_KEY);
        let refresh = self.storage.remove_item(REFRESH_TOKEN_KEY);
        access.and(refresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn tokens(access: &str, refresh: &str) -> AuthTokens {
        AuthTokens {
            access_token: access.into(),
            refresh_token: refresh.into(),
        }
    }

    #[test]
    fn test_store_and_clear() {
        let store = TokenStore::in_memory();
        assert!(!store.has_session());

        store.store(&tokens("A1", "R1")).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));

        store.clear().unwrap();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn test_empty_values_read_as_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(ACCESS_TOKEN_KEY, "").unwrap();
        let store = TokenStore::new(storage);
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_clear_attempts_both_slots() {
        let mut storage = MockTokenStorage::new();
        storage
            .expect_remove_item()
            .with(eq(ACCESS_TOKEN_KEY))
            .times(1)
            .returning(|key| Err(StorageError::remove(key, "read-only")));
        storage
            .expect_remove_item()
            .with(eq(REFRESH_TOKEN_KEY))
            .times(1)
            .returning(|_| Ok(()));

        let store = TokenStore::new(Arc::new(storage));
        assert!(matches!(store.clear(), Err(StorageError::Remove { .. })));
    }

    #[test]
    fn test_debug_does_not_leak_tokens() {
        let store = TokenStore::in_memory();
        store.store(&tokens("secret-a", "secret-r")).unwrap();
        let rendered = format!("{store:?}");
        assert!(!rendered.contains("secret"));
    }
}
