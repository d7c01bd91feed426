//! Adjustment drafts and their validation (Draft → Validated).
//!
//! Persisting the validated adjustment and applying its lines to stock is the
//! infrastructure layer's job; this module only decides which lines survive.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storeledger_catalog::AdjustableItem;
use storeledger_core::money::parse_decimal;
use storeledger_core::{AdjustmentKey, DomainError, DomainResult, ProductKey, VariantKey};

use crate::adjustment::{AdjustmentLine, AdjustmentType, StockAdjustment};
use crate::guard::check_line;

/// A requested line: which stock target, and how much.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentCandidate {
    pub product_key: ProductKey,
    pub variant_key: Option<VariantKey>,
    pub quantity: Decimal,
}

impl AdjustmentCandidate {
    pub fn new(product_key: ProductKey, variant_key: Option<VariantKey>, quantity: Decimal) -> Self {
        Self {
            product_key,
            variant_key,
            quantity,
        }
    }

    /// Build a candidate from raw text input. Malformed keys or a non-numeric
    /// quantity are rejected before any stock is looked up.
    pub fn parse(product: &str, variant: Option<&str>, quantity: &str) -> DomainResult<Self> {
        let product_key = product.parse()?;
        let variant_key = match variant.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.parse()?),
            _ => None,
        };
        let quantity = parse_decimal("quantity", quantity)?;
        Ok(Self::new(product_key, variant_key, quantity))
    }
}

/// A candidate that did not survive validation, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    pub candidate: AdjustmentCandidate,
    pub reason: DomainError,
}

/// Adjustment as requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentDraft {
    adjustment_type: AdjustmentType,
    date: NaiveDate,
    note: String,
    candidates: Vec<AdjustmentCandidate>,
}

impl AdjustmentDraft {
    pub fn new(
        adjustment_type: AdjustmentType,
        date: NaiveDate,
        note: impl Into<String>,
        candidates: Vec<AdjustmentCandidate>,
    ) -> DomainResult<Self> {
        if candidates.is_empty() {
            return Err(DomainError::validation("at least one item must be selected"));
        }
        Ok(Self {
            adjustment_type,
            date,
            note: note.into().trim().to_string(),
            candidates,
        })
    }

    pub fn adjustment_type(&self) -> AdjustmentType {
        self.adjustment_type
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn candidates(&self) -> &[AdjustmentCandidate] {
        &self.candidates
    }

    /// Validate every candidate against the current state of its target.
    ///
    /// `resolve` looks up the target. Its outer error aborts validation (the
    /// store could not be reached); an inner domain error (missing product,
    /// mode mismatch) only rejects that line. Surviving lines freeze name,
    /// unit and purchase price as resolved.
    pub fn validate<F, E>(self, mut resolve: F) -> Result<ValidatedAdjustment, E>
    where
        F: FnMut(&AdjustmentCandidate) -> Result<DomainResult<AdjustableItem>, E>,
    {
        let mut lines = Vec::with_capacity(self.candidates.len());
        let mut rejected = Vec::new();

        for candidate in self.candidates {
            let verdict = resolve(&candidate)?.and_then(|item| {
                check_line(self.adjustment_type, candidate.quantity, &item)?;
                Ok(AdjustmentLine::snapshot(&item, candidate.quantity))
            });
            match verdict {
                Ok(line) => lines.push(line),
                Err(reason) => rejected.push(RejectedLine { candidate, reason }),
            }
        }

        Ok(ValidatedAdjustment {
            adjustment_type: self.adjustment_type,
            date: self.date,
            note: self.note,
            lines,
            rejected,
        })
    }
}

/// Outcome of validation: surviving lines plus rejected candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAdjustment {
    adjustment_type: AdjustmentType,
    date: NaiveDate,
    note: String,
    lines: Vec<AdjustmentLine>,
    rejected: Vec<RejectedLine>,
}

impl ValidatedAdjustment {
    pub fn adjustment_type(&self) -> AdjustmentType {
        self.adjustment_type
    }

    pub fn lines(&self) -> &[AdjustmentLine] {
        &self.lines
    }

    pub fn rejected(&self) -> &[RejectedLine] {
        &self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Turn the surviving lines into a ledger entry under an allocated key.
    ///
    /// Fails with [`DomainError::EmptyAdjustment`] when no line survived.
    pub fn into_adjustment(
        self,
        key: AdjustmentKey,
        created_at: DateTime<Utc>,
    ) -> DomainResult<(StockAdjustment, Vec<RejectedLine>)> {
        let adjustment = StockAdjustment::record(
            key,
            self.date,
            self.adjustment_type,
            self.lines,
            self.note,
            created_at,
        )?;
        Ok((adjustment, self.rejected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn item(key: &str, on_hand: i64, reserved: i64) -> AdjustableItem {
        AdjustableItem {
            product_key: ProductKey::new(key).unwrap(),
            variant_key: None,
            name: format!("item {key}"),
            category: "Staples".to_string(),
            subcategory: "Flour".to_string(),
            on_hand,
            reserved,
            available: on_hand - reserved,
            unit: "kg".to_string(),
            purchase_price: dec!(45),
        }
    }

    fn candidate(key: &str, qty: Decimal) -> AdjustmentCandidate {
        AdjustmentCandidate::new(ProductKey::new(key).unwrap(), None, qty)
    }

    fn lookup(c: &AdjustmentCandidate) -> Result<DomainResult<AdjustableItem>, Infallible> {
        Ok(match c.product_key.as_str() {
            "PRD-0001" => Ok(item("PRD-0001", 20, 0)),
            "PRD-0002" => Ok(item("PRD-0002", 5, 3)),
            other => Err(DomainError::not_found(format!("product {other}"))),
        })
    }

    #[test]
    fn parse_rejects_non_numeric_quantity() {
        assert!(matches!(
            AdjustmentCandidate::parse("PRD-0001", None, "a few"),
            Err(DomainError::Validation(_))
        ));
        let c = AdjustmentCandidate::parse("PRD-0001", Some(" PRD-0001-v02 "), "1.5").unwrap();
        assert_eq!(c.variant_key.unwrap().as_str(), "PRD-0001-v02");
        assert_eq!(c.quantity, dec!(1.5));
        assert!(AdjustmentCandidate::parse("PRD-0001", Some(""), "1").unwrap().variant_key.is_none());
    }

    #[test]
    fn draft_requires_candidates() {
        assert!(AdjustmentDraft::new(AdjustmentType::Damage, date(), "", vec![]).is_err());
    }

    #[test]
    fn failing_lines_are_dropped_and_siblings_survive() {
        let draft = AdjustmentDraft::new(
            AdjustmentType::Damage,
            date(),
            " weekly count ",
            vec![
                candidate("PRD-0001", dec!(4)),
                candidate("PRD-0002", dec!(3)),
                candidate("PRD-0009", dec!(1)),
                candidate("PRD-0001", dec!(0)),
            ],
        )
        .unwrap();

        let validated = draft.validate(lookup).unwrap();
        assert_eq!(validated.lines().len(), 1);
        assert_eq!(validated.lines()[0].line_total, dec!(180));
        assert_eq!(validated.rejected().len(), 3);
        assert!(matches!(
            validated.rejected()[0].reason,
            DomainError::InsufficientAvailability { .. }
        ));
        assert!(matches!(validated.rejected()[1].reason, DomainError::NotFound(_)));
        assert!(matches!(validated.rejected()[2].reason, DomainError::Validation(_)));

        let (adj, rejected) = validated
            .into_adjustment(AdjustmentKey::new("ADJ-0001").unwrap(), Utc::now())
            .unwrap();
        assert_eq!(adj.note(), "weekly count");
        assert_eq!(adj.total_price(), dec!(180));
        assert_eq!(rejected.len(), 3);
    }

    #[test]
    fn returns_check_reservation_not_availability() {
        let draft = AdjustmentDraft::new(
            AdjustmentType::Return,
            date(),
            "",
            vec![candidate("PRD-0002", dec!(3)), candidate("PRD-0001", dec!(1))],
        )
        .unwrap();
        let validated = draft.validate(lookup).unwrap();
        assert_eq!(validated.lines().len(), 1);
        assert!(matches!(
            validated.rejected()[0].reason,
            DomainError::InsufficientReservation { .. }
        ));
    }

    #[test]
    fn all_lines_rejected_is_an_empty_adjustment() {
        let draft = AdjustmentDraft::new(
            AdjustmentType::CartStock,
            date(),
            "",
            vec![candidate("PRD-0001", dec!(21))],
        )
        .unwrap();
        let validated = draft.validate(lookup).unwrap();
        assert!(validated.is_empty());
        assert_eq!(
            validated
                .into_adjustment(AdjustmentKey::new("ADJ-0001").unwrap(), Utc::now())
                .unwrap_err(),
            DomainError::EmptyAdjustment
        );
    }

    #[test]
    fn resolver_failure_aborts_validation() {
        let draft = AdjustmentDraft::new(
            AdjustmentType::Damage,
            date(),
            "",
            vec![candidate("PRD-0001", dec!(1))],
        )
        .unwrap();
        let result = draft.validate(|_| Err::<DomainResult<AdjustableItem>, _>("store down"));
        assert_eq!(result.unwrap_err(), "store down");
    }
}
