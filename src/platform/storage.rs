//! Save slots
//!
//! A `SaveStore` keeps opaque byte blobs under short slot names. The Playing
//! scene encodes a `WorldSnapshot` as RON and hands the bytes over; the store
//! knows nothing about the format.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::SaveError;

pub trait SaveStore {
    /// Returns false if the data could not be written. Failures are logged.
    fn save(&self, slot: &str, data: &[u8]) -> bool;
    /// `None` for an empty slot or an unreadable file.
    fn load(&self, slot: &str) -> Option<Vec<u8>>;
}

fn valid_slot(slot: &str) -> bool {
    !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Slots as `<slot>.ron` files in one directory.
#[derive(Debug, Clone)]
pub struct LocalSaveStore {
    base_dir: PathBuf,
}

impl LocalSaveStore {
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Per-user data directory, falling back to `./saves`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn user_default() -> Self {
        let dir = dirs::data_dir()
            .map(|d| d.join("dino-island").join("saves"))
            .unwrap_or_else(|| PathBuf::from("saves"));
        Self::with_base_dir(dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, slot: &str) -> Result<PathBuf, SaveError> {
        if !valid_slot(slot) {
            return Err(SaveError::EmptySlot(slot.to_string()));
        }
        Ok(self.base_dir.join(format!("{}.ron", slot)))
    }

    pub fn try_save(&self, slot: &str, data: &[u8]) -> Result<PathBuf, SaveError> {
        let path = self.path_for(slot)?;
        std::fs::create_dir_all(&self.base_dir)?;
        // write then rename so a crash never leaves half a save
        let tmp = path.with_extension("ron.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &path)?;
        Ok(path)
    }

    pub fn try_load(&self, slot: &str) -> Result<Vec<u8>, SaveError> {
        let path = self.path_for(slot)?;
        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SaveError::EmptySlot(slot.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl SaveStore for LocalSaveStore {
    fn save(&self, slot: &str, data: &[u8]) -> bool {
        match self.try_save(slot, data) {
            Ok(path) => {
                tracing::info!("saved slot {} to {}", slot, path.display());
                true
            }
            Err(e) => {
                tracing::error!("failed to save slot {}: {}", slot, e);
                false
            }
        }
    }

    fn load(&self, slot: &str) -> Option<Vec<u8>> {
        match self.try_load(slot) {
            Ok(data) => Some(data),
            Err(SaveError::EmptySlot(_)) => {
                tracing::info!("slot {} is empty", slot);
                None
            }
            Err(e) => {
                tracing::error!("failed to load slot {}: {}", slot, e);
                None
            }
        }
    }
}

/// In-memory slots, for tests and platforms without a filesystem.
#[derive(Debug, Default)]
pub struct MemorySaveStore {
    slots: RefCell<FxHashMap<String, Vec<u8>>>,
}

impl SaveStore for MemorySaveStore {
    fn save(&self, slot: &str, data: &[u8]) -> bool {
        if !valid_slot(slot) {
            return false;
        }
        self.slots.borrow_mut().insert(slot.to_string(), data.to_vec());
        true
    }

    fn load(&self, slot: &str) -> Option<Vec<u8>> {
        self.slots.borrow().get(slot).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_slot() {
        let dir = TempDir::new().unwrap();
        let store = LocalSaveStore::with_base_dir(dir.path().join("saves"));

        assert!(store.save("quick", b"(seed: 7)"));
        assert_eq!(store.load("quick").as_deref(), Some(&b"(seed: 7)"[..]));
        assert!(dir.path().join("saves").join("quick.ron").exists());
    }

    #[test]
    fn test_missing_slot_is_none() {
        let dir = TempDir::new().unwrap();
        let store = LocalSaveStore::with_base_dir(dir.path());
        assert!(store.load("nothing").is_none());
        assert!(matches!(store.try_load("nothing"), Err(SaveError::EmptySlot(_))));
    }

    #[test]
    fn test_slot_names_cannot_escape_directory() {
        let dir = TempDir::new().unwrap();
        let store = LocalSaveStore::with_base_dir(dir.path());
        assert!(!store.save("../evil", b"x"));
        assert!(!store.save("", b"x"));
    }

    #[test]
    fn test_overwrite_replaces_data() {
        let dir = TempDir::new().unwrap();
        let store = LocalSaveStore::with_base_dir(dir.path());
        store.save("quick", b"one");
        store.save("quick", b"two");
        assert_eq!(store.load("quick").unwrap(), b"two");
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySaveStore::default();
        assert!(store.load("quick").is_none());
        assert!(store.save("quick", b"abc"));
        assert_eq!(store.load("quick").unwrap(), b"abc");
    }
}
