//! Typed access on top of the JSON-level [`RecordStore`].

use std::collections::VecDeque;

use serde::Serialize;
use serde::de::DeserializeOwned;

use storeledger_catalog::Product;
use storeledger_core::{DomainError, ExpectedVersion};
use storeledger_delivery::{DeliveryArea, DeliveryType};
use storeledger_inventory::StockAdjustment;

use super::collections;
use super::r#trait::{RecordStore, ScanFilter, StoreError, StoredRecord};
use crate::error::ServiceError;

/// A domain type persisted as one record of a fixed collection.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;

    fn record_key(&self) -> &str;
}

impl Record for Product {
    const COLLECTION: &'static str = collections::PRODUCTS;

    fn record_key(&self) -> &str {
        self.key().as_str()
    }
}

impl Record for StockAdjustment {
    const COLLECTION: &'static str = collections::STOCK_ADJUSTMENTS;

    fn record_key(&self) -> &str {
        self.key().as_str()
    }
}

impl Record for DeliveryArea {
    const COLLECTION: &'static str = collections::DELIVERY_AREAS;

    fn record_key(&self) -> &str {
        self.key().as_str()
    }
}

impl Record for DeliveryType {
    const COLLECTION: &'static str = collections::DELIVERY_TYPES;

    fn record_key(&self) -> &str {
        self.key().as_str()
    }
}

/// A decoded record and the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<T> {
    pub version: u64,
    pub record: T,
}

impl<T: Record> Loaded<T> {
    fn decode(stored: StoredRecord) -> Result<Self, StoreError> {
        let record = serde_json::from_value(stored.body).map_err(|e| {
            StoreError::Serialization(format!("{}/{}: {e}", stored.collection, stored.key))
        })?;
        Ok(Self {
            version: stored.version,
            record,
        })
    }
}

/// Lazy scan over every page of a collection.
///
/// Pages are fetched on demand; a store failure is yielded once and ends the
/// iteration.
pub struct Scan<'a, S: ?Sized> {
    store: &'a S,
    collection: &'a str,
    filter: Option<ScanFilter>,
    page_size: usize,
    buffer: VecDeque<StoredRecord>,
    cursor: Option<String>,
    pages: usize,
    done: bool,
}

impl<'a, S: RecordStore + ?Sized> Scan<'a, S> {
    /// Pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }
}

impl<'a, S: RecordStore + ?Sized> Iterator for Scan<'a, S> {
    type Item = Result<StoredRecord, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }
            if self.done {
                return None;
            }

            let page = match self.store.scan_page(
                self.collection,
                self.filter.as_ref(),
                self.cursor.as_deref(),
                self.page_size,
            ) {
                Ok(page) => page,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            };
            self.pages += 1;
            tracing::debug!(
                collection = self.collection,
                page = self.pages,
                records = page.records.len(),
                "scan page fetched"
            );

            self.buffer.extend(page.records);
            match page.next_cursor {
                Some(next) => self.cursor = Some(next),
                None => self.done = true,
            }
        }
    }
}

/// Typed helpers available on every [`RecordStore`].
pub trait RecordStoreExt: RecordStore {
    fn load<T: Record>(&self, key: &str) -> Result<Option<Loaded<T>>, StoreError> {
        self.get(T::COLLECTION, key)?.map(Loaded::decode).transpose()
    }

    /// Like [`RecordStoreExt::load`], but a missing record is `NotFound`.
    fn load_required<T: Record>(&self, key: &str) -> Result<Loaded<T>, ServiceError> {
        self.load::<T>(key)?.ok_or_else(|| {
            DomainError::not_found(format!("{} record {key}", T::COLLECTION)).into()
        })
    }

    fn save<T: Record>(&self, record: &T, expected: ExpectedVersion) -> Result<u64, StoreError> {
        let body = serde_json::to_value(record).map_err(|e| {
            StoreError::Serialization(format!("{}/{}: {e}", T::COLLECTION, record.record_key()))
        })?;
        self.put(T::COLLECTION, record.record_key(), body, expected)
    }

    fn scan_all<'a>(
        &'a self,
        collection: &'a str,
        filter: Option<ScanFilter>,
        page_size: usize,
    ) -> Scan<'a, Self> {
        Scan {
            store: self,
            collection,
            filter,
            page_size,
            buffer: VecDeque::new(),
            cursor: None,
            pages: 0,
            done: false,
        }
    }

    /// Exhaust a scan of `T`'s collection and decode every record.
    fn scan_records<T: Record>(
        &self,
        filter: Option<ScanFilter>,
        page_size: usize,
    ) -> Result<Vec<Loaded<T>>, StoreError> {
        self.scan_all(T::COLLECTION, filter, page_size)
            .map(|r| r.and_then(Loaded::<T>::decode))
            .collect()
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_store::InMemoryRecordStore;
    use serde_json::json;

    #[test]
    fn scan_all_walks_every_page_lazily() {
        let store = InMemoryRecordStore::new();
        for i in 0..7 {
            store
                .put("things", &format!("T-{i}"), json!({ "n": i }), ExpectedVersion::Any)
                .unwrap();
        }

        let mut scan = store.scan_all("things", None, 3);
        assert_eq!(scan.pages_fetched(), 0);
        assert!(scan.next().is_some());
        assert_eq!(scan.pages_fetched(), 1);

        let rest: Vec<_> = scan.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(rest.len(), 6);
        assert_eq!(scan.pages_fetched(), 3);
    }

    #[test]
    fn undecodable_bodies_are_serialization_errors() {
        let store = InMemoryRecordStore::new();
        store
            .put(collections::PRODUCTS, "PRD-0001", json!({ "name": 3 }), ExpectedVersion::Any)
            .unwrap();
        assert!(matches!(
            store.load::<Product>("PRD-0001"),
            Err(StoreError::Serialization(_))
        ));
        assert!(store.load::<Product>("PRD-0002").unwrap().is_none());
        assert!(matches!(
            store.load_required::<Product>("PRD-0002"),
            Err(ServiceError::Domain(DomainError::NotFound(_)))
        ));
    }
}
