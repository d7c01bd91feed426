//! Unit-of-measure conversion within the weight and volume families.
//!
//! Catalog data carries free-text unit symbols. Only two families are known;
//! anything else converts 1:1 so that an unfamiliar unit never blocks variant
//! creation.

use rust_decimal::Decimal;

/// Family of interconvertible units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFamily {
    Weight,
    Volume,
}

/// A recognized unit: its family and its factor relative to the family base
/// (kilogram for weight, litre for volume).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownUnit {
    pub family: UnitFamily,
    pub factor: Decimal,
}

impl KnownUnit {
    /// Look up a unit symbol, case-insensitively and ignoring surrounding
    /// whitespace.
    pub fn parse(symbol: &str) -> Option<Self> {
        let thousandth = Decimal::new(1, 3);
        let (family, factor) = match symbol.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => (UnitFamily::Weight, Decimal::ONE),
            "g" | "gm" | "gms" | "gram" | "grams" => (UnitFamily::Weight, thousandth),
            "l" | "ltr" | "liter" | "litre" | "liters" | "litres" => {
                (UnitFamily::Volume, Decimal::ONE)
            }
            "ml" | "milliliter" | "millilitre" | "milliliters" | "millilitres" => {
                (UnitFamily::Volume, thousandth)
            }
            _ => return None,
        };
        Some(Self { family, factor })
    }
}

/// Express `quantity` of `from` in `to`.
///
/// Same family: `quantity * from.factor / to.factor`. Different or unknown
/// families: the quantity is returned unchanged. Non-positive quantities
/// yield zero.
pub fn convert(quantity: Decimal, from: &str, to: &str) -> Decimal {
    if quantity <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    match (KnownUnit::parse(from), KnownUnit::parse(to)) {
        (Some(f), Some(t)) if f.family == t.family => quantity * f.factor / t.factor,
        _ => quantity,
    }
}

/// Whether two unit symbols can be converted into each other exactly.
pub fn same_family(a: &str, b: &str) -> bool {
    matches!(
        (KnownUnit::parse(a), KnownUnit::parse(b)),
        (Some(x), Some(y)) if x.family == y.family
    )
}
