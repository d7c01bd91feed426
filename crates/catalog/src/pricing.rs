//! Suggested variant prices derived from a parent's per-unit price.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storeledger_core::money::round_currency;

use crate::units;

/// Suggested purchase and sale price for a variant. Callers may override either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    /// Variant sell quantity expressed in the parent's sell unit.
    pub ratio: Decimal,
}

/// Scale the parent's per-sell-unit prices by the variant's share of that unit.
///
/// `ratio = convert(variant_sell_qty, variant_sell_unit, parent_sell_unit)`;
/// both prices are multiplied by the ratio and rounded to two places.
pub fn suggest_variant_prices(
    parent_purchase_price: Decimal,
    parent_sale_price: Decimal,
    variant_sell_qty: Decimal,
    variant_sell_unit: &str,
    parent_sell_unit: &str,
) -> PriceSuggestion {
    let ratio = units::convert(variant_sell_qty, variant_sell_unit, parent_sell_unit);
    PriceSuggestion {
        purchase_price: round_currency(parent_purchase_price * ratio),
        sale_price: round_currency(parent_sale_price * ratio),
        ratio,
    }
}
