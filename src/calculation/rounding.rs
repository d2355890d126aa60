//! Numeric tolerance and rounding helpers shared by every stage.

use rust_decimal::{Decimal, RoundingStrategy};

/// Returns true if `amount` lies within `tolerance` of zero.
///
/// # Examples
///
/// ```
/// use settle_engine::calculation::is_negligible;
/// use rust_decimal::Decimal;
///
/// let tolerance = Decimal::new(1, 2);
/// assert!(is_negligible(Decimal::new(-1, 2), tolerance));
/// assert!(!is_negligible(Decimal::new(11, 3), tolerance));
/// ```
pub fn is_negligible(amount: Decimal, tolerance: Decimal) -> bool {
    amount.abs() <= tolerance
}

/// Rounds a monetary amount to `decimal_places`, midpoints away from zero.
///
/// # Examples
///
/// ```
/// use settle_engine::calculation::round_amount;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_amount(Decimal::from_str("2.345").unwrap(), 2), Decimal::from_str("2.35").unwrap());
/// assert_eq!(round_amount(Decimal::from_str("-2.345").unwrap(), 2), Decimal::from_str("-2.35").unwrap());
/// ```
pub fn round_amount(amount: Decimal, decimal_places: u32) -> Decimal {
    amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds toward zero at `decimal_places`.
pub(crate) fn truncate_amount(amount: Decimal, decimal_places: u32) -> Decimal {
    amount.round_dp_with_strategy(decimal_places, RoundingStrategy::ToZero)
}

/// Rounds away from zero at `decimal_places`.
pub(crate) fn expand_amount(amount: Decimal, decimal_places: u32) -> Decimal {
    amount.round_dp_with_strategy(decimal_places, RoundingStrategy::AwayFromZero)
}
