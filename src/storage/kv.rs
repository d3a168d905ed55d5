use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::error::{CaseError, Result};

/// One JSON document stored under `namespace/key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub key: String,
    pub owner: String,
    pub payload: serde_json::Value,
}

/// Persistence port behind the case-record repositories.
///
/// Writes are last-write-wins. Replacing an entry keeps its position, so
/// `scan` always returns entries in first-insertion order.
pub trait KeyValueStore {
    fn put(&self, namespace: &str, entry: StoredEntry) -> Result<()>;

    fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredEntry>>;

    /// Returns whether an entry was removed.
    fn delete(&self, namespace: &str, key: &str) -> Result<bool>;

    /// Entries of a namespace, optionally restricted to one owner.
    fn scan(&self, namespace: &str, owner: Option<&str>) -> Result<Vec<StoredEntry>>;

    /// Number of entries per namespace.
    fn stats(&self) -> Result<BTreeMap<String, usize>>;
}

/// In-process store, used by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespaces: Mutex<HashMap<String, Vec<StoredEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<StoredEntry>>>> {
        self.namespaces
            .lock()
            .map_err(|_| CaseError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&self, namespace: &str, entry: StoredEntry) -> Result<()> {
        let mut namespaces = self.lock()?;
        let entries = namespaces.entry(namespace.to_string()).or_default();

        match entries.iter_mut().find(|existing| existing.key == entry.key) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredEntry>> {
        let namespaces = self.lock()?;
        Ok(namespaces
            .get(namespace)
            .and_then(|entries| entries.iter().find(|e| e.key == key))
            .cloned())
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<bool> {
        let mut namespaces = self.lock()?;
        let Some(entries) = namespaces.get_mut(namespace) else {
            return Ok(false);
        };

        let before = entries.len();
        entries.retain(|e| e.key != key);
        Ok(entries.len() != before)
    }

    fn scan(&self, namespace: &str, owner: Option<&str>) -> Result<Vec<StoredEntry>> {
        let namespaces = self.lock()?;
        Ok(namespaces
            .get(namespace)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| owner.map_or(true, |o| e.owner == o))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn stats(&self) -> Result<BTreeMap<String, usize>> {
        let namespaces = self.lock()?;
        Ok(namespaces
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(ns, entries)| (ns.clone(), entries.len()))
            .collect())
    }
}
