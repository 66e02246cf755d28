//! Storage backends for the registry.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::Result;

/// On-disk shape of the registry: two string-keyed maps (user ids are decimal
/// strings, JSON objects cannot key on numbers) plus a timestamp for
/// operators poking at the file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub user_to_code: HashMap<String, String>,
    #[serde(default)]
    pub code_to_user: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

/// Where registry bindings live between mutations.
///
/// `load` runs once at startup, `save` after every mutation. An absent
/// document is an empty registry, not an error.
pub trait RegistryStore: Send + Sync {
    fn load(&self) -> Result<RegistryDocument>;
    fn save(&self, doc: &RegistryDocument) -> Result<()>;
}

/// Keeps bindings for the lifetime of the process only.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryStore;

impl RegistryStore for MemoryStore {
    fn load(&self) -> Result<RegistryDocument> {
        Ok(RegistryDocument::default())
    }

    fn save(&self, _doc: &RegistryDocument) -> Result<()> {
        Ok(())
    }
}

/// Durable JSON document at a fixed path.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<RegistryDocument> {
        if !self.path.exists() {
            return Ok(RegistryDocument::default());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(RegistryDocument::default());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, doc: &RegistryDocument) -> Result<()> {
        let mut doc = doc.clone();
        doc.saved_at = Some(Utc::now().to_rfc3339());
        fs::write(&self.path, serde_json::to_string(&doc)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_store(name: &str) -> (PathBuf, JsonFileStore) {
        let path = std::env::temp_dir().join(format!(
            "wl-store-{name}-{}-{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        (path.clone(), JsonFileStore::new(path))
    }

    #[test]
    fn save_then_load_round_trips_and_stamps_saved_at() {
        let (path, store) = tmp_store("roundtrip");
        let mut doc = RegistryDocument::default();
        doc.user_to_code.insert("7".to_string(), "abc".to_string());
        doc.code_to_user.insert("abc".to_string(), "7".to_string());

        store.save(&doc).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.user_to_code, doc.user_to_code);
        assert_eq!(loaded.code_to_user, doc.code_to_user);
        assert!(loaded.saved_at.is_some());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn absent_file_loads_empty() {
        let (_, store) = tmp_store("absent");
        let loaded = store.load().unwrap();
        assert!(loaded.user_to_code.is_empty());
        assert!(loaded.code_to_user.is_empty());
    }

    #[test]
    fn blank_file_loads_empty() {
        let (path, store) = tmp_store("blank");
        fs::write(&path, "  \n").unwrap();
        let loaded = store.load().unwrap();
        assert!(loaded.user_to_code.is_empty());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let (path, store) = tmp_store("corrupt");
        fs::write(&path, "{ not json").unwrap();
        assert!(store.load().is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_fields_deserialize_as_empty_maps() {
        let doc: RegistryDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.user_to_code.is_empty());
        assert!(doc.code_to_user.is_empty());
        assert_eq!(doc.saved_at, None);
    }

    #[test]
    fn memory_store_loads_empty_and_accepts_saves() {
        let store = MemoryStore;
        store.save(&RegistryDocument::default()).unwrap();
        assert!(store.load().unwrap().user_to_code.is_empty());
    }
}
