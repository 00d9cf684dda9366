//! Credential storage.
//!
//! The client reads the store before every request, so implementations keep
//! the current pair in memory and only touch disk on change.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use staymate_types::TokenPair;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("failed to write credentials to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove credentials at {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode credentials: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<TokenPair>;
    fn save(&self, pair: &TokenPair) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    pair: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            pair: Mutex::new(Some(pair)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<TokenPair> {
        self.pair.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn save(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        *self.pair.lock().unwrap_or_else(PoisonError::into_inner) = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.pair.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// JSON file store, written owner-only with crash-safe replace.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cache: Mutex<Option<Option<TokenPair>>>,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Option<TokenPair> {
        staymate_utils::recover_bak_file(&self.path);
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to read credentials: {e}");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring unreadable credentials file: {e}");
                None
            }
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<TokenPair> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get_or_insert_with(|| self.read_file()).clone()
    }

    fn save(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        let json = serde_json::to_vec_pretty(pair)?;
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        staymate_utils::persist_secret_file(&self.path, &json).map_err(|source| {
            TokenStoreError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        *cache = Some(Some(pair.clone()));
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        *cache = Some(None);
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(TokenStoreError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use staymate_types::{AccessToken, RefreshToken};

    use super::*;

    fn pair(access: &str) -> TokenPair {
        TokenPair::issued_at(
            AccessToken::new(access),
            RefreshToken::new("refresh"),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().is_none());
        store.save(&pair("a1")).unwrap();
        assert_eq!(store.load().unwrap().access.expose_secret(), "a1");
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        FileTokenStore::new(&path).save(&pair("persisted")).unwrap();

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.load().unwrap().access.expose_secret(), "persisted");
    }

    #[test]
    fn file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileTokenStore::new(&path);
        store.save(&pair("x")).unwrap();

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(FileTokenStore::new(&path).load().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn credentials_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        FileTokenStore::new(&path).save(&pair("x")).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
