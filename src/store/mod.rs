//! Key-value persistence layer.
//!
//! Repositories talk to storage exclusively through [`KeyValueStore`]: an
//! opaque mapping from string key to bytes. Two implementations ship with
//! the crate:
//!
//! ```text
//!                 ┌──────────────────────┐
//!                 │    KeyValueStore     │
//!                 │ get/set/delete/exists│
//!                 └──────────┬───────────┘
//!                            │
//!           ┌────────────────┴────────────────┐
//!           ▼                                 ▼
//!    ┌─────────────┐                   ┌─────────────┐
//!    │ MemoryStore │                   │  GitStore   │
//!    │  (HashMap)  │                   │ (git2 repo) │
//!    └─────────────┘                   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use gitkv::store::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set("greeting", b"hello".to_vec()).unwrap();
//! assert_eq!(store.get("greeting").unwrap(), Some(b"hello".to_vec()));
//! ```

mod error;
mod git;
mod memory;

use std::sync::Arc;

pub use error::{StoreError, StoreResult};
pub use git::{
    BranchName, CommitId, CommitInfo, GitSignature, GitStore, GitStoreOptions, StoreStats,
};
pub use memory::MemoryStore;

/// A mapping from string key to byte sequence.
///
/// `delete` on an absent key is a no-op here; "must exist" semantics belong
/// to the repository layer. The two conditional methods have check-then-act
/// defaults that are not atomic; stores that can do better override them.
pub trait KeyValueStore {
    /// read the value at `key`, `None` if absent
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// insert or overwrite the value at `key`
    fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// remove `key` if present
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// check whether `key` holds a value
    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// overwrite `key` only if it already exists
    ///
    /// Returns whether the write happened.
    fn set_if_present(&self, key: &str, value: Vec<u8>) -> StoreResult<bool> {
        if !self.exists(key)? {
            return Ok(false);
        }
        self.set(key, value)?;
        Ok(true)
    }

    /// remove `key` only if it exists
    ///
    /// Returns whether a value was removed.
    fn delete_if_present(&self, key: &str) -> StoreResult<bool> {
        if !self.exists(key)? {
            return Ok(false);
        }
        self.delete(key)?;
        Ok(true)
    }
}

macro_rules! forward_store {
    ($($ty:ty),*) => {
        $(
            impl<S: KeyValueStore + ?Sized> KeyValueStore for $ty {
                fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
                    (**self).get(key)
                }

                fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
                    (**self).set(key, value)
                }

                fn delete(&self, key: &str) -> StoreResult<()> {
                    (**self).delete(key)
                }

                fn exists(&self, key: &str) -> StoreResult<bool> {
                    (**self).exists(key)
                }

                fn set_if_present(&self, key: &str, value: Vec<u8>) -> StoreResult<bool> {
                    (**self).set_if_present(key, value)
                }

                fn delete_if_present(&self, key: &str) -> StoreResult<bool> {
                    (**self).delete_if_present(key)
                }
            }
        )*
    };
}

forward_store!(&S, Box<S>, Arc<S>);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Store that only implements the required methods, so the default
    /// conditional methods are exercised.
    #[derive(Default)]
    struct PlainStore {
        map: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl KeyValueStore for PlainStore {
        fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
            Ok(self.map.lock().get(key).cloned())
        }

        fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
            self.map.lock().insert(key.to_string(), value);
            Ok(())
        }

        fn delete(&self, key: &str) -> StoreResult<()> {
            self.map.lock().remove(key);
            Ok(())
        }
    }

    #[test]
    fn test_default_exists() {
        let store = PlainStore::default();
        assert!(!store.exists("k").unwrap());
        store.set("k", vec![1]).unwrap();
        assert!(store.exists("k").unwrap());
    }

    #[test]
    fn test_default_set_if_present() {
        let store = PlainStore::default();
        assert!(!store.set_if_present("k", vec![1]).unwrap());
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", vec![1]).unwrap();
        assert!(store.set_if_present("k", vec![2]).unwrap());
        assert_eq!(store.get("k").unwrap(), Some(vec![2]));
    }

    #[test]
    fn test_default_delete_if_present() {
        let store = PlainStore::default();
        assert!(!store.delete_if_present("k").unwrap());

        store.set("k", vec![1]).unwrap();
        assert!(store.delete_if_present("k").unwrap());
        assert!(!store.exists("k").unwrap());
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let store = PlainStore::default();
        store.delete("missing").unwrap();
    }

    #[test]
    fn test_forwarding_impls() {
        let store = Arc::new(PlainStore::default());
        let shared = Arc::clone(&store);
        shared.set("k", vec![7]).unwrap();

        let by_ref: &PlainStore = &store;
        assert_eq!(by_ref.get("k").unwrap(), Some(vec![7]));

        let boxed: Box<dyn KeyValueStore> = Box::new(PlainStore::default());
        assert!(!boxed.exists("k").unwrap());
    }
}
