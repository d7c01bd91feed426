//! Per-line quantity guardrail, checked before the ledger table is applied.

use rust_decimal::Decimal;

use storeledger_catalog::AdjustableItem;
use storeledger_core::{DomainError, DomainResult};

use crate::adjustment::AdjustmentType;

/// Check a requested quantity against the current stock of its target.
///
/// - the quantity must be positive;
/// - a return cannot exceed what is currently reserved;
/// - every other type cannot exceed what is available (on hand − reserved).
pub fn check_line(
    adjustment_type: AdjustmentType,
    quantity: Decimal,
    item: &AdjustableItem,
) -> DomainResult<()> {
    if quantity <= Decimal::ZERO {
        return Err(DomainError::validation("quantity must be greater than 0"));
    }

    match adjustment_type {
        AdjustmentType::Return => {
            let reserved = Decimal::from(item.reserved);
            if quantity > reserved {
                return Err(DomainError::InsufficientReservation {
                    requested: quantity,
                    reserved,
                });
            }
        }
        _ => {
            let available = Decimal::from(item.available);
            if quantity > available {
                return Err(DomainError::InsufficientAvailability {
                    requested: quantity,
                    available,
                });
            }
        }
    }
    Ok(())
}
