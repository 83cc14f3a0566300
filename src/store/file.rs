use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::{KeyValueStore, StoreError, StoreKey};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::CorruptFile {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!(path = %path.display(), keys = entries.len(), "opened json store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(entries).map_err(|source| {
            StoreError::CorruptFile {
                path: self.path.clone(),
                source,
            }
        })?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key.as_str()).cloned())
    }

    fn set(&self, key: StoreKey, value: String) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let mut next = entries.clone();
        next.insert(key.as_str().to_string(), value);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn delete(&self, key: StoreKey) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        if !entries.contains_key(key.as_str()) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key.as_str());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("fipa-store-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn missing_file_opens_as_empty_store() {
        let path = scratch_path("data.json");
        let store = JsonFileStore::open(&path).expect("open");
        assert_eq!(store.get(StoreKey::CurrentIncome).expect("get"), None);
        assert!(!path.exists());
    }

    #[test]
    fn values_survive_reopen() {
        let path = scratch_path("data.json");
        {
            let store = JsonFileStore::open(&path).expect("open");
            store
                .set(StoreKey::CurrentIncome, "8000".to_string())
                .expect("set income");
            store
                .set(StoreKey::CurrentSavings, "5000".to_string())
                .expect("set savings");
            store.delete(StoreKey::CurrentSavings).expect("delete");
        }

        let reopened = JsonFileStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.get(StoreKey::CurrentIncome).expect("get"),
            Some("8000".to_string())
        );
        assert_eq!(reopened.get(StoreKey::CurrentSavings).expect("get"), None);

        let raw = fs::read_to_string(&path).expect("read file");
        assert!(raw.contains("\"currentIncome\""));
        assert!(!path.with_extension("tmp").exists());
        cleanup(&path);
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let path = scratch_path("data.json");
        let store = JsonFileStore::open(&path).expect("open");
        store
            .set(StoreKey::CurrentIncome, "8000".to_string())
            .expect("set income");

        fs::create_dir_all(path.with_extension("tmp")).expect("block temp file");
        let err = store
            .set(StoreKey::CurrentIncome, "9000".to_string())
            .expect_err("temp path is a directory");
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(store.delete(StoreKey::CurrentIncome).is_err());
        assert_eq!(
            store.get(StoreKey::CurrentIncome).expect("get"),
            Some("8000".to_string())
        );

        let reopened = JsonFileStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.get(StoreKey::CurrentIncome).expect("get"),
            Some("8000".to_string())
        );
        cleanup(&path);
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let path = scratch_path("data.json");
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, "[1, 2, 3]").expect("write");

        let err = JsonFileStore::open(&path).expect_err("must reject non-object file");
        assert!(matches!(err, StoreError::CorruptFile { .. }));
        cleanup(&path);
    }
}
