use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use storeledger_core::ExpectedVersion;
use std::sync::Arc;

/// A record as held by the store: JSON body plus its version token.
///
/// Versions start at 1 on first write and increase by one on every put, so a
/// caller that read version `v` can write back with `ExpectedVersion::Exact(v)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub collection: String,
    pub key: String,
    pub version: u64,
    pub body: JsonValue,
}

/// Server-side scan filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanFilter {
    /// Keys starting with the given prefix.
    KeyPrefix(String),
    /// Top-level body field equal to the given JSON value.
    FieldEquals { field: String, value: JsonValue },
}

impl ScanFilter {
    pub fn key_prefix(prefix: impl Into<String>) -> Self {
        Self::KeyPrefix(prefix.into())
    }

    pub fn field_equals(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::FieldEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, key: &str, body: &JsonValue) -> bool {
        match self {
            ScanFilter::KeyPrefix(prefix) => key.starts_with(prefix.as_str()),
            ScanFilter::FieldEquals { field, value } => body.get(field) == Some(value),
        }
    }
}

/// One page of a scan.
///
/// The filter is applied after the page is cut, so a page may hold fewer
/// records than the limit (or none) while `next_cursor` is still set. Callers
/// keep going until `next_cursor` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    pub records: Vec<StoredRecord>,
    pub next_cursor: Option<String>,
}

/// Record store operation error.
///
/// Infrastructure failures only; business failures are `DomainError`s.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or failed mid-operation.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// Version token mismatch on a conditional write.
    #[error("version conflict: {0}")]
    Conflict(String),

    /// A stored body could not be encoded or decoded.
    #[error("record serialization failed: {0}")]
    Serialization(String),
}

/// Key/value record store, one namespace per collection.
///
/// Works at the JSON level so it stays free of domain types; typed access
/// lives in [`super::RecordStoreExt`].
pub trait RecordStore: Send + Sync {
    fn get(&self, collection: &str, key: &str) -> Result<Option<StoredRecord>, StoreError>;

    /// Upsert `body` under `key` and return the new version.
    ///
    /// `ExpectedVersion::Any` overwrites unconditionally; `Exact(v)` fails with
    /// [`StoreError::Conflict`] unless the current version is `v` (0 = absent).
    fn put(
        &self,
        collection: &str,
        key: &str,
        body: JsonValue,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError>;

    /// Remove a record. Returns whether it existed.
    fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError>;

    /// Fetch one page of keys strictly after `cursor`, in key order.
    fn scan_page(
        &self,
        collection: &str,
        filter: Option<&ScanFilter>,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, StoreError>;
}

impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    fn get(&self, collection: &str, key: &str) -> Result<Option<StoredRecord>, StoreError> {
        (**self).get(collection, key)
    }

    fn put(
        &self,
        collection: &str,
        key: &str,
        body: JsonValue,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError> {
        (**self).put(collection, key, body, expected)
    }

    fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        (**self).delete(collection, key)
    }

    fn scan_page(
        &self,
        collection: &str,
        filter: Option<&ScanFilter>,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, StoreError> {
        (**self).scan_page(collection, filter, cursor, limit)
    }
}
