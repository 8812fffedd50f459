//! Key-value stores for local state that lives outside the chain.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use grid_contracts::error::{GridError, GridResult};
use grid_core::{
    persist::{read_optional, write_atomic},
    traits::KeyValueStore,
};

fn lock_map<'a>(
    map: &'a Mutex<BTreeMap<String, String>>,
) -> GridResult<MutexGuard<'a, BTreeMap<String, String>>> {
    map.lock().map_err(|e| GridError::KeyValueFailed {
        reason: format!("key-value lock poisoned: {}", e),
    })
}

#[derive(Default)]
pub struct InMemoryKeyValueStore {
    map: Mutex<BTreeMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> GridResult<Option<String>> {
        Ok(lock_map(&self.map)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> GridResult<()> {
        lock_map(&self.map)?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A key-value store persisted as one JSON object.
///
/// The whole map is rewritten atomically on every `set`; values are small and
/// writes are rare (one per integrity check).
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    map: Mutex<BTreeMap<String, String>>,
}

impl JsonFileKeyValueStore {
    pub fn open(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref().to_path_buf();
        let map = match read_optional(&path).map_err(|e| GridError::KeyValueFailed {
            reason: format!("failed to read '{}': {}", path.display(), e),
        })? {
            Some(contents) => serde_json::from_str(&contents).map_err(|e| {
                GridError::KeyValueFailed {
                    reason: format!("malformed key-value file '{}': {}", path.display(), e),
                }
            })?,
            None => BTreeMap::new(),
        };
        Ok(Self {
            path,
            map: Mutex::new(map),
        })
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> GridResult<Option<String>> {
        Ok(lock_map(&self.map)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> GridResult<()> {
        let mut map = lock_map(&self.map)?;
        let mut next = map.clone();
        next.insert(key.to_string(), value.to_string());

        let bytes = serde_json::to_vec_pretty(&next)?;
        write_atomic(&self.path, &bytes).map_err(|e| GridError::KeyValueFailed {
            reason: format!("failed to write '{}': {}", self.path.display(), e),
        })?;

        *map = next;
        Ok(())
    }
}
