//! Stock ledger: how each adjustment type moves on-hand and reserved quantities.
//!
//! | type                               | on hand      | reserved              |
//! |------------------------------------|--------------|-----------------------|
//! | cart_stock                         | on_hand − q  | reserved + q          |
//! | return                             | on_hand + q  | max(0, reserved − q)  |
//! | damage / internal / extra_given    | on_hand − q  | unchanged             |
//!
//! Quantities are whole units in storage; a fractional result is truncated
//! toward zero. Availability guardrails are checked before this table is
//! applied (see [`crate::guard`]).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use storeledger_catalog::{Product, StockLevel, StockMode};
use storeledger_core::{DomainError, DomainResult, VariantKey};

use crate::adjustment::AdjustmentType;

/// Before/after quantities of one applied adjustment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub on_hand_before: i64,
    pub on_hand_after: i64,
    pub reserved_before: i64,
    pub reserved_after: i64,
}

/// Apply one adjustment to a stock level and recompute its status.
///
/// Stock is counted in whole units: the quantity is truncated once, so every
/// column moves by the same amount and `on_hand + reserved` is preserved by a
/// cart reservation. A quantity below one unit moves nothing.
pub fn apply_to_level(
    level: &mut StockLevel,
    adjustment_type: AdjustmentType,
    quantity: Decimal,
) -> DomainResult<StockMovement> {
    let quantity = quantity.trunc();
    let on_hand = Decimal::from(level.on_hand());
    let reserved = Decimal::from(level.reserved());

    let (next_on_hand, next_reserved) = match adjustment_type {
        AdjustmentType::CartStock => (on_hand - quantity, reserved + quantity),
        AdjustmentType::Return => (on_hand + quantity, (reserved - quantity).max(Decimal::ZERO)),
        AdjustmentType::Damage
        | AdjustmentType::InternalConsumption
        | AdjustmentType::ExtraGiven => (on_hand - quantity, reserved),
    };

    let movement = StockMovement {
        on_hand_before: level.on_hand(),
        on_hand_after: whole_units(next_on_hand)?,
        reserved_before: level.reserved(),
        reserved_after: whole_units(next_reserved)?,
    };
    level.replace_quantities(movement.on_hand_after, movement.reserved_after);
    Ok(movement)
}

/// Apply one adjustment to a product's stock target.
///
/// `target` is `None` for a parent-mode product and the variant key for a
/// variant-mode product. Parent-mode targets also re-derive marketplace
/// visibility from the new availability.
pub fn apply_to_product(
    product: &mut Product,
    target: Option<&VariantKey>,
    adjustment_type: AdjustmentType,
    quantity: Decimal,
) -> DomainResult<StockMovement> {
    let movement = apply_to_level(product.stock_level_mut(target)?, adjustment_type, quantity)?;
    if product.stock_mode() == StockMode::Parent {
        product.refresh_marketplace_visibility();
    }
    Ok(movement)
}

fn whole_units(quantity: Decimal) -> DomainResult<i64> {
    quantity
        .trunc()
        .to_i64()
        .ok_or_else(|| DomainError::validation(format!("quantity {quantity} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use storeledger_catalog::{NewProduct, NewStocking, Pricing, SellQuantity, StockStatus};
    use storeledger_core::ProductKey;

    fn parent_product(opening_stock: i64, low_stock_threshold: u32) -> Product {
        Product::create(
            ProductKey::new("PRD-0001").unwrap(),
            NewProduct {
                name: "Sunflower Oil".to_string(),
                category: "Oils".to_string(),
                subcategory: "Cooking".to_string(),
                stocking: NewStocking::Parent {
                    opening_stock,
                    unit: "l".to_string(),
                    low_stock_threshold,
                },
                sell: SellQuantity::new(dec!(1), "l"),
                pricing: Pricing::new(dec!(120), dec!(160), dec!(0)),
                marketplace_visible: true,
                description: None,
                tags: vec![],
                expiry_date: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn cart_reservation_past_availability_hides_product() {
        let mut p = parent_product(100, 10);
        assert_eq!(p.status(), Some(StockStatus::InStock));

        let m = apply_to_product(&mut p, None, AdjustmentType::CartStock, dec!(95)).unwrap();
        assert_eq!(m.on_hand_after, 5);
        assert_eq!(m.reserved_after, 95);

        let stock = p.stock().unwrap();
        assert_eq!(stock.available(), -90);
        assert_eq!(stock.status(), StockStatus::LowStock);
        assert!(!p.marketplace_visible());
    }

    #[test]
    fn return_restores_visibility() {
        let mut p = parent_product(10, 0);
        apply_to_product(&mut p, None, AdjustmentType::CartStock, dec!(10)).unwrap();
        assert!(!p.marketplace_visible());

        apply_to_product(&mut p, None, AdjustmentType::Return, dec!(10)).unwrap();
        assert_eq!(p.stock().unwrap().on_hand(), 10);
        assert_eq!(p.stock().unwrap().reserved(), 0);
        assert!(p.marketplace_visible());
    }

    #[test]
    fn low_stock_alone_keeps_product_visible() {
        let mut p = parent_product(20, 10);
        apply_to_product(&mut p, None, AdjustmentType::Damage, dec!(15)).unwrap();
        assert_eq!(p.status(), Some(StockStatus::LowStock));
        assert!(p.marketplace_visible());
    }

    #[test]
    fn return_never_drives_reservation_negative() {
        let mut level = StockLevel::from_parts(10, 2, 0).unwrap();
        let m = apply_to_level(&mut level, AdjustmentType::Return, dec!(5)).unwrap();
        assert_eq!(m.reserved_after, 0);
        assert_eq!(m.on_hand_after, 15);
    }

    #[test]
    fn fractional_quantities_move_whole_units() {
        let mut level = StockLevel::opening(10, 0).unwrap();
        apply_to_level(&mut level, AdjustmentType::ExtraGiven, dec!(0.25)).unwrap();
        assert_eq!(level.on_hand(), 10);

        let original = StockLevel::from_parts(10, 0, 0).unwrap();
        let mut level = original.clone();
        let m = apply_to_level(&mut level, AdjustmentType::CartStock, dec!(2.5)).unwrap();
        assert_eq!((m.on_hand_after, m.reserved_after), (8, 2));
        apply_to_level(&mut level, AdjustmentType::Return, dec!(2.5)).unwrap();
        assert_eq!(level, original);
    }

    #[test]
    fn variant_mode_targets_the_variant_only() {
        use storeledger_catalog::{NewVariant, NewVariantStock};

        let mut p = parent_product(0, 0);
        p.change_stock_mode(NewStocking::Variant, Utc::now()).unwrap();
        let vk = p
            .add_variant(
                NewVariant {
                    name: Some("Oil 500 ml".to_string()),
                    sell: SellQuantity::new(dec!(500), "ml"),
                    purchase_price: Some(dec!(60)),
                    sale_price: Some(dec!(80)),
                    compare_price: None,
                    stock: Some(NewVariantStock {
                        opening_stock: 30,
                        unit: "bottle".to_string(),
                        low_stock_threshold: 5,
                    }),
                    marketplace_visible: Some(true),
                    expiry_date: None,
                },
                Utc::now(),
            )
            .unwrap();

        apply_to_product(&mut p, Some(&vk), AdjustmentType::CartStock, dec!(28)).unwrap();
        let level = p.stock_level(Some(&vk)).unwrap();
        assert_eq!(level.on_hand(), 2);
        assert_eq!(level.reserved(), 28);
        assert_eq!(level.status(), StockStatus::LowStock);
        assert!(p.variant(&vk).unwrap().marketplace_visible);

        assert!(apply_to_product(&mut p, None, AdjustmentType::Damage, dec!(1)).is_err());
    }

    /// (on hand, reserved, threshold) with at least one unit available.
    fn level_strategy() -> impl Strategy<Value = (i64, i64, u32)> {
        (1i64..10_000, 0u32..50).prop_flat_map(|(on_hand, threshold)| {
            (Just(on_hand), 0..on_hand, Just(threshold))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: reserving then returning the same quantity restores the level.
        #[test]
        fn cart_then_return_is_identity((on_hand, reserved, threshold) in level_strategy(), pick in 0.0f64..1.0) {
            let original = StockLevel::from_parts(on_hand, reserved, threshold).unwrap();
            let available = original.available();
            let q = ((available as f64 * pick) as i64).clamp(1, available);

            let mut level = original.clone();
            apply_to_level(&mut level, AdjustmentType::CartStock, Decimal::from(q)).unwrap();
            apply_to_level(&mut level, AdjustmentType::Return, Decimal::from(q)).unwrap();
            prop_assert_eq!(level, original);
        }

        /// Property: fractional quantities reserve and return the same whole units.
        #[test]
        fn fractional_cart_then_return_is_identity(
            (on_hand, reserved, threshold) in level_strategy(),
            pick in 0.0f64..1.0,
            hundredths in 0i64..100,
        ) {
            let original = StockLevel::from_parts(on_hand, reserved, threshold).unwrap();
            let available = original.available();
            let whole = ((available as f64 * pick) as i64).clamp(0, available - 1);
            let q = Decimal::from(whole) + Decimal::new(hundredths, 2);

            let mut level = original.clone();
            let m = apply_to_level(&mut level, AdjustmentType::CartStock, q).unwrap();
            prop_assert_eq!(m.on_hand_after + m.reserved_after, on_hand + reserved);
            apply_to_level(&mut level, AdjustmentType::Return, q).unwrap();
            prop_assert_eq!(level, original);
        }

        /// Property: write-offs strictly decrease on hand and never touch the reservation.
        #[test]
        fn write_offs_only_decrease_on_hand(
            (on_hand, reserved, threshold) in level_strategy(),
            q in 1i64..500,
            idx in 0usize..3,
        ) {
            let kind = [
                AdjustmentType::Damage,
                AdjustmentType::InternalConsumption,
                AdjustmentType::ExtraGiven,
            ][idx];
            let mut level = StockLevel::from_parts(on_hand, reserved, threshold).unwrap();
            let m = apply_to_level(&mut level, kind, Decimal::from(q)).unwrap();
            prop_assert!(m.on_hand_after < m.on_hand_before);
            prop_assert_eq!(m.reserved_after, m.reserved_before);
            prop_assert_eq!(level.status(), StockStatus::resolve(level.on_hand(), threshold));
        }
    }
}
