//! Exact decimal helpers for currency amounts.

use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};

/// Decimal places kept for currency amounts.
pub const CURRENCY_SCALE: u32 = 2;

/// Round a currency amount to two places (banker's rounding).
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp(CURRENCY_SCALE)
}

/// Reject negative amounts; `field` names the offending input in the error.
pub fn ensure_non_negative(field: &str, amount: Decimal) -> DomainResult<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

/// Parse a decimal typed by a human (`"12.50"`, `" 3 "`).
pub fn parse_decimal(field: &str, text: &str) -> DomainResult<Decimal> {
    text.trim()
        .parse::<Decimal>()
        .map_err(|_| DomainError::validation(format!("{field} must be a number, got '{text}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_to_even() {
        assert_eq!(round_currency(dec!(37.505)), dec!(37.50));
        assert_eq!(round_currency(dec!(37.515)), dec!(37.52));
        assert_eq!(round_currency(dec!(25)), dec!(25));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(ensure_non_negative("salePrice", dec!(0)).is_ok());
        assert!(ensure_non_negative("salePrice", dec!(-0.01)).is_err());
    }

    #[test]
    fn parses_trimmed_numbers_only() {
        assert_eq!(parse_decimal("qty", " 2.5 ").unwrap(), dec!(2.5));
        assert!(matches!(
            parse_decimal("qty", "two"),
            Err(DomainError::Validation(_))
        ));
    }
}
