//! Inventory domain module.
//!
//! Stock adjustments (the append-only ledger), the per-line guardrail, and the
//! mutation table that moves on-hand and reserved quantities. Pure domain
//! logic: persistence and ID allocation live in `storeledger-infra`.

pub mod adjustment;
pub mod draft;
pub mod guard;
pub mod ledger;

pub use adjustment::{AdjustmentLine, AdjustmentType, StockAdjustment};
pub use draft::{AdjustmentCandidate, AdjustmentDraft, RejectedLine, ValidatedAdjustment};
pub use guard::check_line;
pub use ledger::{StockMovement, apply_to_level, apply_to_product};
