//! Token persistence in a JSON file

use medibook_http::{StorageError, TokenStorage};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Keeps token slots in a small JSON object on disk
///
/// The file is read once when opened and rewritten on every change.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
    slots: Mutex<BTreeMap<String, String>>,
}

impl FileTokenStorage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let slots = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "Ignoring unreadable token file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path,
            slots: Mutex::new(slots),
        }
    }

    fn persist(&self, slots: &BTreeMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(slots)?;
        std::fs::write(&self.path, json)?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

impl TokenStorage for FileTokenStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key.to_string(), value.to_string());
        self.persist(&slots)
            .map_err(|err| StorageError::write(key, err))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&slots)
            .map_err(|err| StorageError::remove(key, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibook_http::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

    #[test]
    fn test_tokens_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data/tokens.json");

        let storage = FileTokenStorage::open(&path);
        assert!(storage.get_item(ACCESS_TOKEN_KEY).is_none());
        storage.set_item(ACCESS_TOKEN_KEY, "A1").unwrap();
        storage.set_item(REFRESH_TOKEN_KEY, "R1").unwrap();

        let reopened = FileTokenStorage::open(&path);
        assert_eq!(reopened.get_item(ACCESS_TOKEN_KEY).as_deref(), Some("A1"));
        assert_eq!(reopened.get_item(REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
    }

    #[test]
    fn test_remove_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tokens.json");

        let storage = FileTokenStorage::open(&path);
        storage.set_item(ACCESS_TOKEN_KEY, "A1").unwrap();
        storage.remove_item(ACCESS_TOKEN_KEY).unwrap();
        storage.remove_item(REFRESH_TOKEN_KEY).unwrap();

        assert!(FileTokenStorage::open(&path).get_item(ACCESS_TOKEN_KEY).is_none());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tokens.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileTokenStorage::open(&path);
        assert!(storage.get_item(ACCESS_TOKEN_KEY).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tokens.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let storage = FileTokenStorage::open(&path);
        storage.set_item(ACCESS_TOKEN_KEY, "A1").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
