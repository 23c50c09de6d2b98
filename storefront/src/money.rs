// storefront/src/money.rs

//! Money helpers. Amounts are `Decimal` and always shown with two decimals.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serializer;

/// Rounds half away from zero to two decimals and pins the scale to 2,
/// so `100` becomes `100.00`.
pub fn round_money(amount: Decimal) -> Decimal {
  let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
  rounded.rescale(2);
  rounded
}

pub fn format_amount(amount: Decimal) -> String {
  round_money(amount).to_string()
}

/// `serialize_with` helper: money as a two-decimal string.
pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(&format_amount(*amount))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  #[test]
  fn formats_with_exactly_two_decimals() {
    assert_eq!(format_amount(Decimal::from(270)), "270.00");
    assert_eq!(format_amount(Decimal::from_str("12.5").unwrap()), "12.50");
    assert_eq!(format_amount(Decimal::from_str("0.125").unwrap()), "0.13");
    assert_eq!(format_amount(Decimal::from_str("99.994").unwrap()), "99.99");
  }
}
