//! Stock level value type and availability status.

use serde::{Deserialize, Serialize};

use storeledger_core::{DomainError, DomainResult};

/// Availability status derived from on-hand quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    /// Resolve the status for an on-hand quantity.
    ///
    /// Evaluated in order: nothing on hand is out of stock; a positive
    /// threshold that is reached is low stock; everything else is in stock.
    /// A threshold of 0 disables low-stock alerting entirely.
    pub fn resolve(on_hand: i64, low_stock_threshold: u32) -> Self {
        if on_hand <= 0 {
            StockStatus::OutOfStock
        } else if low_stock_threshold > 0 && on_hand <= i64::from(low_stock_threshold) {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "out-of-stock",
            StockStatus::LowStock => "low-stock",
            StockStatus::InStock => "in-stock",
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-hand and cart-reserved quantities of one stock-carrying unit
/// (a parent-mode product or a variant-mode variant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    on_hand: i64,
    reserved: i64,
    low_stock_threshold: u32,
    status: StockStatus,
}

impl StockLevel {
    /// Opening stock with nothing reserved.
    pub fn opening(on_hand: i64, low_stock_threshold: u32) -> DomainResult<Self> {
        Self::from_parts(on_hand, 0, low_stock_threshold)
    }

    pub fn from_parts(on_hand: i64, reserved: i64, low_stock_threshold: u32) -> DomainResult<Self> {
        if on_hand < 0 {
            return Err(DomainError::validation("on-hand quantity cannot be negative"));
        }
        if reserved < 0 {
            return Err(DomainError::validation("reserved quantity cannot be negative"));
        }
        Ok(Self {
            on_hand,
            reserved,
            low_stock_threshold,
            status: StockStatus::resolve(on_hand, low_stock_threshold),
        })
    }

    pub fn on_hand(&self) -> i64 {
        self.on_hand
    }

    pub fn reserved(&self) -> i64 {
        self.reserved
    }

    /// On hand minus reserved. May be negative after a large cart reservation.
    pub fn available(&self) -> i64 {
        self.on_hand - self.reserved
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    pub fn status(&self) -> StockStatus {
        self.status
    }

    /// Replace both quantities and recompute the status.
    ///
    /// Used by the stock ledger after applying an adjustment; the ledger is
    /// responsible for the arithmetic, this type for keeping status in sync.
    pub fn replace_quantities(&mut self, on_hand: i64, reserved: i64) {
        self.on_hand = on_hand;
        self.reserved = reserved.max(0);
        self.refresh_status();
    }

    /// Manual stock correction (catalog edit); reservation is untouched.
    pub fn set_on_hand(&mut self, on_hand: i64) -> DomainResult<()> {
        if on_hand < 0 {
            return Err(DomainError::validation("on-hand quantity cannot be negative"));
        }
        self.on_hand = on_hand;
        self.refresh_status();
        Ok(())
    }

    pub fn set_low_stock_threshold(&mut self, threshold: u32) {
        self.low_stock_threshold = threshold;
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        self.status = StockStatus::resolve(self.on_hand, self.low_stock_threshold);
    }
}
