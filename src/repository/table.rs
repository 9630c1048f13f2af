//! The repository: CRUD over one table of a key-value store.

use std::marker::PhantomData;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{Codec, JsonCodec};
use crate::model::{Identifier, Item, StorageKey, TableName};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::store::{KeyValueStore, MemoryStore};

/// CRUD access to the items of one table.
///
/// Every identifier is either absent or present. `create` makes it present
/// (overwriting silently), `update` and `delete` require it to be present,
/// and `delete` makes it absent again.
///
/// The repository holds no lock of its own. `update` and `delete` go through
/// the store's conditional writes, which are atomic for [`MemoryStore`] and
/// [`GitStore`](crate::store::GitStore).
pub struct Repository<V, C = JsonCodec, S = MemoryStore> {
    table: TableName,
    codec: C,
    store: S,
    _value: PhantomData<fn() -> V>,
}

impl<V, C, S> Repository<V, C, S>
where
    V: Serialize + DeserializeOwned,
    C: Codec,
    S: KeyValueStore,
{
    pub fn new(table: TableName, codec: C, store: S) -> Self {
        Self {
            table,
            codec,
            store,
            _value: PhantomData,
        }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// the storage key an identifier maps to in this table
    pub fn key_for(&self, id: &Identifier) -> StorageKey {
        StorageKey::derive(&self.table, id)
    }

    /// Store an item, overwriting any existing record with the same
    /// identifier.
    pub fn create(&self, item: &Item<V>) -> RepositoryResult<()> {
        let key = self.key_for(&item.id);
        let bytes = self.codec.encode(&item.value)?;

        self.store.set(key.as_str(), bytes)?;
        debug!("repository: create table={} key={}", self.table, key);
        Ok(())
    }

    /// Read the value stored for `id`.
    pub fn read(&self, id: &Identifier) -> RepositoryResult<V> {
        let key = self.key_for(id);

        let bytes = match self.store.get(key.as_str())? {
            Some(bytes) => bytes,
            None => {
                debug!("repository: read table={} key={} not found", self.table, key);
                return Err(RepositoryError::RecordNotFound(id.clone()));
            }
        };

        let value = self.codec.decode(&bytes)?;
        debug!("repository: read table={} key={}", self.table, key);
        Ok(value)
    }

    /// Replace the stored value of an existing item.
    ///
    /// Fails with `RecordNotFound` and writes nothing if the item is absent.
    pub fn update(&self, item: &Item<V>) -> RepositoryResult<()> {
        let key = self.key_for(&item.id);
        if !self.store.exists(key.as_str())? {
            debug!("repository: update table={} key={} not found", self.table, key);
            return Err(RepositoryError::RecordNotFound(item.id.clone()));
        }

        let bytes = self.codec.encode(&item.value)?;
        // a delete may land between the check and the write
        if !self.store.set_if_present(key.as_str(), bytes)? {
            debug!("repository: update table={} key={} not found", self.table, key);
            return Err(RepositoryError::RecordNotFound(item.id.clone()));
        }

        debug!("repository: update table={} key={}", self.table, key);
        Ok(())
    }

    /// Remove an existing item.
    ///
    /// Fails with `RecordNotFound` if the item is absent.
    pub fn delete(&self, id: &Identifier) -> RepositoryResult<()> {
        let key = self.key_for(id);

        if !self.store.delete_if_present(key.as_str())? {
            debug!("repository: delete table={} key={} not found", self.table, key);
            return Err(RepositoryError::RecordNotFound(id.clone()));
        }

        debug!("repository: delete table={} key={}", self.table, key);
        Ok(())
    }

    /// Check whether a record exists for `id`.
    pub fn exists(&self, id: &Identifier) -> RepositoryResult<bool> {
        Ok(self.store.exists(self.key_for(id).as_str())?)
    }
}
