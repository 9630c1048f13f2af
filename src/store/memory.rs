//! In-memory reference store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::store::error::StoreResult;
use crate::store::KeyValueStore;

/// A `HashMap`-backed store.
///
/// Clone this to share the same map between repositories; it uses Arc
/// internally. Conditional writes run under a single write lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// number of stored keys
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// all stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.inner.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.inner.write().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.write().remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.inner.read().contains_key(key))
    }

    fn set_if_present(&self, key: &str, value: Vec<u8>) -> StoreResult<bool> {
        let mut map = self.inner.write();
        match map.get_mut(key) {
            Some(slot) => {
                *slot = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_if_present(&self, key: &str) -> StoreResult<bool> {
        Ok(self.inner.write().remove(key).is_some())
    }
}
