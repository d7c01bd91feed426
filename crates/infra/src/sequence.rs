//! Sequential, human-readable identifier allocation (`PRD-0001`, `ADJ-0042`, ...).
//!
//! Two strategies:
//! - `scan`: exhaust a prefix scan of the target collection and take max + 1.
//!   Two concurrent callers can observe the same maximum and hand out the same
//!   id; writers that must not overwrite use `ExpectedVersion::absent()` so a
//!   duplicate surfaces as a conflict.
//! - `counter`: one counter record per prefix in `id_sequences`, seeded from
//!   the scan maximum and advanced with a conditional write. A lost race
//!   degrades to the random fallback instead of a duplicate.
//!
//! Allocation never fails: a store error, or a sequence that cannot advance
//! past `u64::MAX`, falls back to the prefix followed by random uppercase hex.
//!
//! The width is a minimum: suffixes of at least `width` digits take part, so
//! `PRD-9999` is followed by `PRD-10000`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use storeledger_core::ExpectedVersion;

use crate::config::LedgerConfig;
use crate::record_store::{
    RecordStore, RecordStoreExt, ScanFilter, StoreError, collections,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    Scan,
    Counter,
}

/// A prefixed, zero-padded identifier space within one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSpace {
    collection: &'static str,
    prefix: String,
    width: usize,
    fallback_len: usize,
}

impl IdSpace {
    pub fn new(collection: &'static str, prefix: impl Into<String>, width: usize) -> Self {
        Self {
            collection,
            prefix: prefix.into(),
            width,
            fallback_len: 4,
        }
    }

    /// Length of the random hex suffix used when allocation degrades (4..=32).
    pub fn with_fallback_len(mut self, len: usize) -> Self {
        self.fallback_len = len.clamp(4, 32);
        self
    }

    pub fn products() -> Self {
        Self::new(collections::PRODUCTS, "PRD-", 4)
    }

    pub fn adjustments() -> Self {
        Self::new(collections::STOCK_ADJUSTMENTS, "ADJ-", 4)
    }

    pub fn delivery_areas() -> Self {
        Self::new(collections::DELIVERY_AREAS, "PIN-", 4)
    }

    pub fn delivery_types() -> Self {
        Self::new(collections::DELIVERY_TYPES, "DT-", 4)
    }

    pub fn customers() -> Self {
        Self::new(collections::CUSTOMERS, "CUST-", 4).with_fallback_len(8)
    }

    /// Orders are numbered per day: `ORD-YYYYMMDD-0001`.
    pub fn orders(date: NaiveDate) -> Self {
        Self::new(collections::ORDERS, format!("ORD-{}-", date.format("%Y%m%d")), 4)
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn format(&self, n: u64) -> String {
        format!("{}{:0width$}", self.prefix, n, width = self.width)
    }

    /// Numeric suffix of `key` if it is exactly prefix + at least `width`
    /// ASCII digits, and the number fits in a `u64`.
    pub fn parse_suffix(&self, key: &str) -> Option<u64> {
        let digits = key.strip_prefix(self.prefix.as_str())?;
        if digits.len() < self.width.max(1) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    fn successor(&self, n: u64) -> Result<u64, AllocationError> {
        n.checked_add(1).ok_or_else(|| AllocationError::Exhausted {
            prefix: self.prefix.clone(),
        })
    }

    fn fallback(&self) -> String {
        let hex = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("{}{}", self.prefix, &hex[..self.fallback_len])
    }
}

/// Why a sequential id could not be produced.
#[derive(Debug, Error)]
enum AllocationError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("sequence {prefix} cannot advance past {}", u64::MAX)]
    Exhausted { prefix: String },
}

/// Body of a counter record in `id_sequences`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SequenceCounter {
    prefix: String,
    last: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequentialIdAllocator {
    strategy: IdStrategy,
    page_size: usize,
}

impl Default for SequentialIdAllocator {
    fn default() -> Self {
        Self::from_config(&LedgerConfig::default())
    }
}

impl SequentialIdAllocator {
    pub fn new(strategy: IdStrategy, page_size: usize) -> Self {
        Self {
            strategy,
            page_size: page_size.max(1),
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.ids.strategy, config.store.scan_page_size)
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Allocate the next identifier in `space`. Never fails.
    pub fn next<S: RecordStore + ?Sized>(&self, store: &S, space: &IdSpace) -> String {
        let allocated = match self.strategy {
            IdStrategy::Scan => self
                .scan_max(store, space)
                .map_err(AllocationError::from)
                .and_then(|max| space.successor(max))
                .map(|n| space.format(n)),
            IdStrategy::Counter => self.advance_counter(store, space).map(|n| space.format(n)),
        };
        match allocated {
            Ok(id) => id,
            Err(err) => {
                let id = space.fallback();
                warn!(
                    prefix = %space.prefix,
                    error = %err,
                    fallback = %id,
                    "identifier allocation degraded to random suffix"
                );
                id
            }
        }
    }

    /// Highest numeric suffix in `space`, 0 when none. Exhausts every page.
    pub fn scan_max<S: RecordStore + ?Sized>(&self, store: &S, space: &IdSpace) -> Result<u64, StoreError> {
        let mut max = 0u64;
        for record in store.scan_all(
            space.collection,
            Some(ScanFilter::key_prefix(space.prefix.clone())),
            self.page_size,
        ) {
            if let Some(n) = space.parse_suffix(&record?.key) {
                max = max.max(n);
            }
        }
        Ok(max)
    }

    fn advance_counter<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        space: &IdSpace,
    ) -> Result<u64, AllocationError> {
        let (last, expected) = match store.get(collections::ID_SEQUENCES, &space.prefix)? {
            Some(stored) => {
                let counter: SequenceCounter = serde_json::from_value(stored.body)
                    .map_err(|e| StoreError::Serialization(format!("counter {}: {e}", space.prefix)))?;
                (counter.last, ExpectedVersion::Exact(stored.version))
            }
            None => (self.scan_max(store, space)?, ExpectedVersion::absent()),
        };

        let next = space.successor(last)?;
        let body = serde_json::to_value(SequenceCounter {
            prefix: space.prefix.clone(),
            last: next,
        })
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
        store.put(collections::ID_SEQUENCES, &space.prefix, body, expected)?;
        Ok(next)
    }
}
