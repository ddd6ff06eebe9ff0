//! Persistent credential store
//!
//! Holds the opaque session token and the cached branding blob. The file
//! store keeps one obfuscated file per key; the memory store backs tests and
//! ephemeral shells.

use crate::error::StorageError;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Bearer credential string
pub const TOKEN_KEY: &str = "token";
/// Last successfully applied branding JSON blob
pub const BRANDING_KEY: &str = "brandingSettings";

const FILE_EXTENSION: &str = "dat";

// Simple obfuscation key - not cryptographically secure but prevents casual reading
const OBFUSCATION_KEY: &[u8] = b"PulseOne2025CredentialStore";

/// Key-value contract shared by every store implementation.
///
/// `get` never fails: unreadable entries are reported as absent.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed store under the client data directory
pub struct FileCredentialStore {
    data_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        info!("Credential store initialized at {}", data_dir.display());
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // Keys are crate constants, but keep anything path-like out of the file name
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        self.data_dir.join(format!("{}.{}", file_name, FILE_EXTENSION))
    }

    /// Simple XOR obfuscation (not secure, but prevents casual reading)
    fn obfuscate(data: &[u8]) -> Vec<u8> {
        data.iter()
            .enumerate()
            .map(|(i, &byte)| byte ^ OBFUSCATION_KEY[i % OBFUSCATION_KEY.len()])
            .collect()
    }

    fn decode(encoded: &str) -> Option<String> {
        let obfuscated = match BASE64.decode(encoded.trim()) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to decode stored entry (base64): {}", e);
                return None;
            }
        };

        match String::from_utf8(Self::obfuscate(&obfuscated)) {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Failed to decode stored entry (utf8): {}", e);
                None
            }
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        if !path.exists() {
            debug!("No stored entry for {}", key);
            return None;
        }

        let encoded = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to read stored entry {}: {}", key, e);
                return None;
            }
        };

        let value = Self::decode(&encoded);
        if value.is_none() {
            // Corrupted entry, delete it so the next write starts clean
            let _ = std::fs::remove_file(&path);
        }
        value
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key);
        let encoded = BASE64.encode(Self::obfuscate(value.as_bytes()));

        std::fs::write(&path, &encoded).map_err(|e| {
            error!("Failed to write stored entry {}: {}", key, e);
            StorageError::Io(e)
        })?;

        debug!("Stored {} ({} bytes)", key, encoded.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed stored entry {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Failed to remove stored entry {}: {}", key, e);
                Err(StorageError::Io(e))
            }
        }
    }
}

/// In-memory store with the same contract as the file store
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with entries
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        {
            let mut map = store.entries.lock();
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        }
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Read the stored token, treating empty or whitespace-only values as absent
pub fn stored_token(store: &dyn CredentialStore) -> Option<String> {
    store.get(TOKEN_KEY).filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obfuscation_roundtrip() {
        let original = b"Hello, World! This is a test.";
        let obfuscated = FileCredentialStore::obfuscate(original);
        assert_ne!(original.as_slice(), obfuscated.as_slice());
        let recovered = FileCredentialStore::obfuscate(&obfuscated);
        assert_eq!(original.as_slice(), recovered.as_slice());
    }

    #[test]
    fn test_file_store_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path()).unwrap();

        assert!(store.get(TOKEN_KEY).is_none());
        store.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("abc"));

        // Value is not stored in plain text
        let raw = std::fs::read_to_string(dir.path().join("token.dat")).unwrap();
        assert!(!raw.contains("abc"));

        store.remove(TOKEN_KEY).unwrap();
        assert!(store.get(TOKEN_KEY).is_none());
        // Removing again is fine
        store.remove(TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_file_store_keys_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path()).unwrap();

        store.set(TOKEN_KEY, "tok").unwrap();
        store.set(BRANDING_KEY, r##"{"primaryColor":"#111111"}"##).unwrap();
        store.remove(TOKEN_KEY).unwrap();

        assert!(store.get(TOKEN_KEY).is_none());
        assert_eq!(
            store.get(BRANDING_KEY).as_deref(),
            Some(r##"{"primaryColor":"#111111"}"##)
        );
    }

    #[test]
    fn test_file_store_corrupt_entry_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path()).unwrap();
        let path = dir.path().join("token.dat");
        std::fs::write(&path, "%%% not base64 %%%").unwrap();

        assert!(store.get(TOKEN_KEY).is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        FileCredentialStore::new(dir.path())
            .unwrap()
            .set(TOKEN_KEY, "persisted")
            .unwrap();

        let reopened = FileCredentialStore::new(dir.path()).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("persisted"));
    }

    #[test]
    fn test_memory_store_contract() {
        let store = MemoryCredentialStore::with_entries([(TOKEN_KEY, "seed")]);
        assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("seed"));
        store.set(TOKEN_KEY, "next").unwrap();
        assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("next"));
        store.remove(TOKEN_KEY).unwrap();
        assert!(store.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn test_stored_token_treats_blank_as_absent() {
        let store = MemoryCredentialStore::with_entries([(TOKEN_KEY, "")]);
        assert!(stored_token(&store).is_none());

        store.set(TOKEN_KEY, "   ").unwrap();
        assert!(stored_token(&store).is_none());

        store.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(stored_token(&store).as_deref(), Some("abc"));
    }
}
