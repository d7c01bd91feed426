//! Stock adjustment pipeline and ledger queries.
//!
//! ```text
//! AdjustmentDraft
//!   ↓ validate every line against current stock (failing lines dropped)
//! ValidatedAdjustment
//!   ↓ allocate ADJ-NNNN, write the ledger entry once (must not exist yet)
//! Persisted
//!   ↓ apply each line in input order: load product, mutate, write back at
//!     the version that was read
//! Applied
//! ```
//!
//! A line that fails after the ledger entry is written is reported in the
//! outcome; the entry and the lines already applied stay as they are.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use storeledger_catalog::{AdjustableItem, Product};
use storeledger_core::{
    AdjustmentKey, DomainError, DomainResult, ExpectedVersion, ProductKey, VariantKey,
};
use storeledger_inventory::{
    AdjustmentCandidate, AdjustmentDraft, AdjustmentLine, AdjustmentType, RejectedLine,
    StockAdjustment, StockMovement, apply_to_product,
};

use crate::config::LedgerConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::record_store::{RecordStore, RecordStoreExt, ScanFilter, StoreError};
use crate::sequence::{IdSpace, SequentialIdAllocator};

/// A line whose stock write went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedLine {
    pub line_index: usize,
    pub product_key: ProductKey,
    pub variant_key: Option<VariantKey>,
    pub movement: StockMovement,
}

/// A line that could not be applied after the adjustment was persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyFailure {
    pub line_index: usize,
    pub product_key: ProductKey,
    pub variant_key: Option<VariantKey>,
    pub error: ServiceError,
}

/// Result of a submitted adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentOutcome {
    pub adjustment: StockAdjustment,
    /// Candidates dropped during validation.
    pub rejected: Vec<RejectedLine>,
    pub applied: Vec<AppliedLine>,
    pub failures: Vec<ApplyFailure>,
}

impl AdjustmentOutcome {
    pub fn is_fully_applied(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct AdjustmentService<S> {
    store: S,
    ids: SequentialIdAllocator,
    page_size: usize,
}

impl<S> AdjustmentService<S> {
    pub fn new(store: S, config: &LedgerConfig) -> Self {
        Self {
            store,
            ids: SequentialIdAllocator::from_config(config),
            page_size: config.store.scan_page_size,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: RecordStore> AdjustmentService<S> {
    /// Run a draft through validation, persistence and application.
    ///
    /// Fails with `EmptyAdjustment` (nothing written) when no line survives
    /// validation, and with a store error when the lookup or the ledger write
    /// fails. Failures while applying individual lines are returned in the
    /// outcome instead.
    pub fn submit(&self, draft: AdjustmentDraft) -> ServiceResult<AdjustmentOutcome> {
        let adjustment_type = draft.adjustment_type();
        let validated = draft.validate(|candidate| self.resolve(candidate))?;

        for rejected in validated.rejected() {
            warn!(
                adjustment_type = %adjustment_type,
                product_key = %rejected.candidate.product_key,
                variant_key = ?rejected.candidate.variant_key.as_ref().map(VariantKey::as_str),
                reason = %rejected.reason,
                "adjustment line rejected"
            );
        }
        if validated.is_empty() {
            warn!(adjustment_type = %adjustment_type, "no adjustment line passed validation");
            return Err(DomainError::EmptyAdjustment.into());
        }

        let key = AdjustmentKey::new(self.ids.next(&self.store, &IdSpace::adjustments()))?;
        let (adjustment, rejected) = validated.into_adjustment(key, Utc::now())?;
        self.store.save(&adjustment, ExpectedVersion::absent())?;
        info!(
            adjustment_id = %adjustment.key(),
            adjustment_type = %adjustment_type,
            lines = adjustment.lines().len(),
            total_price = %adjustment.total_price(),
            "stock adjustment persisted"
        );

        let mut applied = Vec::with_capacity(adjustment.lines().len());
        let mut failures = Vec::new();
        for (line_index, line) in adjustment.lines().iter().enumerate() {
            match self.apply_line(adjustment_type, line) {
                Ok(movement) => applied.push(AppliedLine {
                    line_index,
                    product_key: line.product_key.clone(),
                    variant_key: line.variant_key.clone(),
                    movement,
                }),
                Err(error) => {
                    warn!(
                        adjustment_id = %adjustment.key(),
                        line_index,
                        product_key = %line.product_key,
                        error = %error,
                        "adjustment line not applied"
                    );
                    failures.push(ApplyFailure {
                        line_index,
                        product_key: line.product_key.clone(),
                        variant_key: line.variant_key.clone(),
                        error,
                    });
                }
            }
        }

        Ok(AdjustmentOutcome {
            adjustment,
            rejected,
            applied,
            failures,
        })
    }

    fn resolve(&self, candidate: &AdjustmentCandidate) -> Result<DomainResult<AdjustableItem>, StoreError> {
        let product = self.store.load::<Product>(candidate.product_key.as_str())?;
        Ok(match product {
            Some(loaded) => loaded.record.adjustable_item(candidate.variant_key.as_ref()),
            None => Err(DomainError::not_found(format!(
                "product {}",
                candidate.product_key
            ))),
        })
    }

    fn apply_line(&self, adjustment_type: AdjustmentType, line: &AdjustmentLine) -> ServiceResult<StockMovement> {
        let mut loaded = self
            .store
            .load_required::<Product>(line.product_key.as_str())?;
        let movement = apply_to_product(
            &mut loaded.record,
            line.variant_key.as_ref(),
            adjustment_type,
            line.quantity,
        )?;
        loaded.record.touch(Utc::now());
        self.store
            .save(&loaded.record, ExpectedVersion::Exact(loaded.version))?;
        Ok(movement)
    }

    pub fn get_adjustment(&self, key: &AdjustmentKey) -> ServiceResult<StockAdjustment> {
        Ok(self
            .store
            .load_required::<StockAdjustment>(key.as_str())?
            .record)
    }

    /// Every adjustment, newest date first (key descending within a date).
    pub fn list_adjustments(&self) -> ServiceResult<Vec<StockAdjustment>> {
        self.list(None)
    }

    pub fn list_by_type(&self, adjustment_type: AdjustmentType) -> ServiceResult<Vec<StockAdjustment>> {
        self.list(Some(ScanFilter::field_equals(
            "adjustment_type",
            adjustment_type.as_str(),
        )))
    }

    /// Adjustments dated within `start..=end`.
    pub fn list_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> ServiceResult<Vec<StockAdjustment>> {
        if start > end {
            return Err(DomainError::validation(format!(
                "start date {start} is after end date {end}"
            ))
            .into());
        }
        let mut all = self.list(None)?;
        all.retain(|a| (start..=end).contains(&a.date()));
        Ok(all)
    }

    fn list(&self, filter: Option<ScanFilter>) -> ServiceResult<Vec<StockAdjustment>> {
        let mut adjustments: Vec<StockAdjustment> = self
            .store
            .scan_records::<StockAdjustment>(filter, self.page_size)?
            .into_iter()
            .map(|loaded| loaded.record)
            .collect();
        adjustments.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| b.key().cmp(a.key())));
        Ok(adjustments)
    }
}
