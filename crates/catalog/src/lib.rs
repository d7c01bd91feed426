//! Catalog domain module.
//!
//! Products, variants, stock levels, unit conversion and price suggestions,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod pricing;
pub mod product;
pub mod stock;
pub mod units;

pub use pricing::{PriceSuggestion, suggest_variant_prices};
pub use product::{
    AdjustableItem, NewProduct, NewStocking, NewVariant, NewVariantStock, Pricing, Product,
    SellQuantity, StockMode, StockedVariant, Stocking, Variant,
};
pub use stock::{StockLevel, StockStatus};
pub use units::{KnownUnit, UnitFamily, convert};
