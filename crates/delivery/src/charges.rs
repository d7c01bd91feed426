//! Delivery charge resolution.
//!
//! Among active tiers whose minimum order value does not exceed the subtotal,
//! the greatest *charge* wins (not the greatest threshold). With no qualifying
//! tier the charge is zero. Area status is not consulted.

use rust_decimal::Decimal;

use crate::area::{ChargeTier, DeliveryArea};

pub fn resolve_charge(tiers: &[ChargeTier], subtotal: Decimal) -> Decimal {
    tiers
        .iter()
        .filter(|t| t.qualifies(subtotal))
        .map(|t| t.charge)
        .fold(Decimal::ZERO, Decimal::max)
}

impl DeliveryArea {
    /// Delivery charge for an order of `subtotal` in this area.
    pub fn delivery_charge(&self, subtotal: Decimal) -> Decimal {
        resolve_charge(self.tiers(), subtotal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::NewChargeTier;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn tiers(rows: &[(Decimal, Decimal, bool)]) -> Vec<ChargeTier> {
        rows.iter()
            .map(|&(min, charge, active)| {
                let mut t = ChargeTier::new(
                    NewChargeTier {
                        minimum_order_value: min,
                        charge,
                    },
                    Utc::now(),
                )
                .unwrap();
                t.active = active;
                t
            })
            .collect()
    }

    #[test]
    fn greatest_qualifying_charge_wins() {
        let t = tiers(&[
            (dec!(0), dec!(40), true),
            (dec!(500), dec!(0), true),
            (dec!(1000), dec!(20), true),
        ]);
        assert_eq!(resolve_charge(&t, dec!(1200)), dec!(40));
        assert_eq!(resolve_charge(&t, dec!(100)), dec!(40));
    }

    #[test]
    fn inactive_and_unmet_tiers_are_ignored() {
        let t = tiers(&[(dec!(0), dec!(40), false), (dec!(500), dec!(30), true)]);
        assert_eq!(resolve_charge(&t, dec!(499.99)), dec!(0));
        assert_eq!(resolve_charge(&t, dec!(500)), dec!(30));
    }

    #[test]
    fn no_tiers_means_free_delivery() {
        assert_eq!(resolve_charge(&[], dec!(10)), Decimal::ZERO);
    }

    fn tier_strategy() -> impl Strategy<Value = (Decimal, Decimal, bool)> {
        (1i64..2_000, any::<bool>()).prop_flat_map(|(min, active)| {
            (Just(Decimal::from(min)), (0..min).prop_map(Decimal::from), Just(active))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the resolved charge is zero or the maximum over qualifying tiers.
        #[test]
        fn resolved_charge_bounds_every_qualifier(
            rows in prop::collection::vec(tier_strategy(), 0..8),
            subtotal in 0i64..3_000,
        ) {
            let t = tiers(&rows);
            let subtotal = Decimal::from(subtotal);
            let charge = resolve_charge(&t, subtotal);

            let qualifying: Vec<_> = t.iter().filter(|x| x.qualifies(subtotal)).collect();
            prop_assert!(qualifying.iter().all(|x| x.charge <= charge));
            if qualifying.is_empty() {
                prop_assert_eq!(charge, Decimal::ZERO);
            } else {
                prop_assert!(qualifying.iter().any(|x| x.charge == charge));
            }
        }
    }
}
