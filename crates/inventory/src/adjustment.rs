use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storeledger_catalog::AdjustableItem;
use storeledger_core::{AdjustmentKey, DomainError, ProductKey, VariantKey};

/// Closed set of stock adjustment kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// Stock moved into customer carts (reserved).
    CartStock,
    /// Stock returned from carts.
    Return,
    /// Damaged or spoiled stock.
    Damage,
    /// Stock used internally.
    InternalConsumption,
    /// Extra quantity given away to customers.
    ExtraGiven,
}

impl AdjustmentType {
    pub const ALL: [AdjustmentType; 5] = [
        AdjustmentType::CartStock,
        AdjustmentType::Return,
        AdjustmentType::Damage,
        AdjustmentType::InternalConsumption,
        AdjustmentType::ExtraGiven,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::CartStock => "cart_stock",
            AdjustmentType::Return => "return",
            AdjustmentType::Damage => "damage",
            AdjustmentType::InternalConsumption => "internal_consumption",
            AdjustmentType::ExtraGiven => "extra_given",
        }
    }

    /// Whether this kind removes stock without touching the reservation.
    pub fn is_write_off(&self) -> bool {
        matches!(
            self,
            AdjustmentType::Damage | AdjustmentType::InternalConsumption | AdjustmentType::ExtraGiven
        )
    }
}

impl core::fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for AdjustmentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| DomainError::validation(format!("unknown adjustment type '{s}'")))
    }
}

/// One line of a stock adjustment, with name, unit and price frozen at
/// validation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLine {
    pub product_key: ProductKey,
    pub variant_key: Option<VariantKey>,
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl AdjustmentLine {
    /// Freeze a line from the current view of its stock target.
    pub fn snapshot(item: &AdjustableItem, quantity: Decimal) -> Self {
        Self {
            product_key: item.product_key.clone(),
            variant_key: item.variant_key.clone(),
            name: item.name.clone(),
            quantity,
            unit: item.unit.clone(),
            unit_price: item.purchase_price,
            line_total: quantity * item.purchase_price,
        }
    }
}

/// Append-only ledger entry. Never edited after creation; a correction is a
/// new adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    key: AdjustmentKey,
    date: NaiveDate,
    adjustment_type: AdjustmentType,
    lines: Vec<AdjustmentLine>,
    total_price: Decimal,
    note: String,
    created_at: DateTime<Utc>,
}

impl StockAdjustment {
    /// Build the ledger entry. Rejects an empty line set.
    pub fn record(
        key: AdjustmentKey,
        date: NaiveDate,
        adjustment_type: AdjustmentType,
        lines: Vec<AdjustmentLine>,
        note: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::EmptyAdjustment);
        }
        let total_price = lines.iter().map(|l| l.line_total).sum();
        Ok(Self {
            key,
            date,
            adjustment_type,
            lines,
            total_price,
            note,
            created_at,
        })
    }

    pub fn key(&self) -> &AdjustmentKey {
        &self.key
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn adjustment_type(&self) -> AdjustmentType {
        self.adjustment_type
    }

    pub fn lines(&self) -> &[AdjustmentLine] {
        &self.lines
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
