use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use storeledger_core::ExpectedVersion;

use super::r#trait::{RecordStore, ScanFilter, ScanPage, StoreError, StoredRecord};

#[derive(Debug, Clone)]
struct Entry {
    version: u64,
    body: JsonValue,
}

type Collection = BTreeMap<String, Entry>;

/// In-memory record store with ordered, paginated scans.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<BTreeMap<String, Collection>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection.
    pub fn len(&self, collection: &str) -> Result<usize, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections.get(collection).map_or(0, BTreeMap::len))
    }

    pub fn is_empty(&self, collection: &str) -> Result<bool, StoreError> {
        Ok(self.len(collection)? == 0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl RecordStore for InMemoryRecordStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<StoredRecord>, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections
            .get(collection)
            .and_then(|c| c.get(key))
            .map(|e| StoredRecord {
                collection: collection.to_string(),
                key: key.to_string(),
                version: e.version,
                body: e.body.clone(),
            }))
    }

    fn put(
        &self,
        collection: &str,
        key: &str,
        body: JsonValue,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let records = collections.entry(collection.to_string()).or_default();

        let current = records.get(key).map_or(0, |e| e.version);
        if !expected.matches(current) {
            return Err(StoreError::Conflict(format!(
                "{collection}/{key}: expected {expected:?}, found {current}"
            )));
        }

        let version = current + 1;
        records.insert(key.to_string(), Entry { version, body });
        Ok(version)
    }

    fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        Ok(collections
            .get_mut(collection)
            .and_then(|c| c.remove(key))
            .is_some())
    }

    fn scan_page(
        &self,
        collection: &str,
        filter: Option<&ScanFilter>,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let Some(records) = collections.get(collection) else {
            return Ok(ScanPage::default());
        };

        let lower = match cursor {
            Some(c) => Bound::Excluded(c.to_string()),
            None => Bound::Unbounded,
        };
        let mut window = records.range((lower, Bound::Unbounded));

        let mut page = ScanPage::default();
        let mut last_key = None;
        for (key, entry) in window.by_ref().take(limit.max(1)) {
            last_key = Some(key.clone());
            if filter.is_none_or(|f| f.matches(key, &entry.body)) {
                page.records.push(StoredRecord {
                    collection: collection.to_string(),
                    key: key.clone(),
                    version: entry.version,
                    body: entry.body.clone(),
                });
            }
        }
        if window.next().is_some() {
            page.next_cursor = last_key;
        }
        Ok(page)
    }
}
