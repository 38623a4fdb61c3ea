//! Currency rounding at presentation boundaries.
//!
//! Stored and aggregated amounts keep full decimal precision so repeated
//! aggregation never compounds rounding error. Rounding happens once, where a
//! value leaves the core (display, export).

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a monetary amount to 2 decimal places, half-up.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up_at_two_places() {
        assert_eq!(round_currency(dec!(1.005)), dec!(1.01));
        assert_eq!(round_currency(dec!(2.344)), dec!(2.34));
        assert_eq!(round_currency(dec!(2.345)), dec!(2.35));
        assert_eq!(round_currency(dec!(200)), dec!(200.00));
    }

    #[test]
    fn negative_amounts_round_away_from_zero() {
        assert_eq!(round_currency(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_currency(dec!(-2.344)), dec!(-2.34));
    }
}
