use std::marker::PhantomData;
use tracing::debug;

use crate::{
    error::Result,
    storage::{
        kv::{KeyValueStore, StoredEntry},
        models::Record,
    },
};

/// Typed CRUD over one record namespace of a `KeyValueStore`.
pub struct Repository<'a, T, S: KeyValueStore + ?Sized> {
    store: &'a S,
    _record: PhantomData<T>,
}

impl<'a, T: Record, S: KeyValueStore + ?Sized> Repository<'a, T, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Insert the record, or replace the one with the same id.
    pub fn upsert_by_id(&self, record: &T) -> Result<()> {
        debug!("Upserting {}/{} for {}", T::NAMESPACE, record.id(), record.owner_id());
        self.store.put(
            T::NAMESPACE,
            StoredEntry {
                key: record.id().to_string(),
                owner: record.owner_id().to_string(),
                payload: serde_json::to_value(record)?,
            },
        )
    }

    /// Returns whether a record was removed.
    pub fn remove_by_id(&self, id: &str) -> Result<bool> {
        let removed = self.store.delete(T::NAMESPACE, id)?;
        debug!("Removing {}/{}: {}", T::NAMESPACE, id, removed);
        Ok(removed)
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.store.get(T::NAMESPACE, id)?.is_some())
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<T>> {
        self.store
            .get(T::NAMESPACE, id)?
            .map(decode)
            .transpose()
    }

    /// Records of one applicant, in the order they were first stored.
    pub fn list_by_owner(&self, owner_id: &str) -> Result<Vec<T>> {
        self.store
            .scan(T::NAMESPACE, Some(owner_id))?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub fn list_all(&self) -> Result<Vec<T>> {
        self.store
            .scan(T::NAMESPACE, None)?
            .into_iter()
            .map(decode)
            .collect()
    }
}

fn decode<T: Record>(entry: StoredEntry) -> Result<T> {
    Ok(serde_json::from_value(entry.payload)?)
}
