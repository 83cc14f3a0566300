mod file;

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::JsonFileStore;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StoreKey {
    CurrentIncome,
    CurrentExpenses,
    CurrentSavings,
    BudgetHistory,
    FinancialPlans,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::CurrentIncome => "currentIncome",
            StoreKey::CurrentExpenses => "currentExpenses",
            StoreKey::CurrentSavings => "currentSavings",
            StoreKey::BudgetHistory => "budgetHistory",
            StoreKey::FinancialPlans => "financialPlans",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store file {path} is not a JSON object of strings: {source}")]
    CorruptFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for {key}: {source}")]
    Encode {
        key: StoreKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode value stored under {key}: {source}")]
    Decode {
        key: StoreKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("store lock poisoned")]
    Poisoned,
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError>;
    fn set(&self, key: StoreKey, value: String) -> Result<(), StoreError>;
    fn delete(&self, key: StoreKey) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(&key).cloned())
    }

    fn set(&self, key: StoreKey, value: String) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key, value);
        Ok(())
    }

    fn delete(&self, key: StoreKey) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ReadOnlyStore {
    pub(crate) inner: MemoryStore,
}

#[cfg(test)]
impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, _key: StoreKey, _value: String) -> Result<(), StoreError> {
        Err(read_only_error())
    }

    fn delete(&self, _key: StoreKey) -> Result<(), StoreError> {
        Err(read_only_error())
    }
}

#[cfg(test)]
fn read_only_error() -> StoreError {
    StoreError::Io {
        path: PathBuf::from("read-only"),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "store is read-only"),
    }
}

#[derive(Clone)]
pub struct Persistence {
    backend: Arc<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn get<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Decode { key, source })
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })?;
        self.backend.set(key, raw)
    }

    pub fn delete(&self, key: StoreKey) -> Result<(), StoreError> {
        self.backend.delete(key)
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}
