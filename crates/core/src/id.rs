//! Strongly-typed record keys used across the domain.
//!
//! Keys are human-readable strings (`PRD-0001`, `PRD-0001-v02`, `ADJ-0007`, ...)
//! allocated by the infrastructure layer; the domain only carries them around.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Key of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductKey(String);

/// Key of a product variant (`<product key>-vNN`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantKey(String);

/// Key of a stock adjustment ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentKey(String);

/// Key of a postal delivery area.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaKey(String);

/// Key of a delivery type (shift) definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryTypeKey(String);

macro_rules! impl_string_key {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap an already-allocated key. Rejects blank input.
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(DomainError::invalid_key(concat!($name, " cannot be empty")));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s.trim())
            }
        }
    };
}

impl_string_key!(ProductKey, "ProductKey");
impl_string_key!(VariantKey, "VariantKey");
impl_string_key!(AdjustmentKey, "AdjustmentKey");
impl_string_key!(AreaKey, "AreaKey");
impl_string_key!(DeliveryTypeKey, "DeliveryTypeKey");

impl VariantKey {
    /// Derive the key of the `ordinal`-th variant (1-based) of a product.
    pub fn for_product(product: &ProductKey, ordinal: usize) -> Self {
        Self(format!("{product}-v{ordinal:02}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_key_is_derived_from_parent_and_ordinal() {
        let product = ProductKey::new("PRD-0012").unwrap();
        assert_eq!(VariantKey::for_product(&product, 1).as_str(), "PRD-0012-v01");
        assert_eq!(VariantKey::for_product(&product, 14).as_str(), "PRD-0012-v14");
    }

    #[test]
    fn blank_keys_are_rejected() {
        assert!(matches!(ProductKey::new("  "), Err(DomainError::InvalidKey(_))));
        assert!("".parse::<AreaKey>().is_err());
    }

    #[test]
    fn keys_serialize_as_plain_strings() {
        let key = AdjustmentKey::new("ADJ-0003").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"ADJ-0003\"");
    }
}
