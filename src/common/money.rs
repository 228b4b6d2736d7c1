// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to cents. Only used at presentation and
/// comparison boundaries; intermediate sums stay exact.
pub fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(to_cents(Decimal::from_str("10.005").unwrap()), Decimal::from_str("10.01").unwrap());
        assert_eq!(to_cents(Decimal::from_str("10.004").unwrap()), Decimal::from_str("10.00").unwrap());
    }
}
