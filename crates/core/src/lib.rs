//! `storeledger-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod money;
pub mod version;

pub use error::{DomainError, DomainResult};
pub use id::{AdjustmentKey, AreaKey, DeliveryTypeKey, ProductKey, VariantKey};
pub use version::ExpectedVersion;
