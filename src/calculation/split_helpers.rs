//! Split generation helpers for expense creation.
//!
//! These run upstream of the engine, where an expense is first recorded.
//! Both helpers produce splits that sum to the expense amount exactly, so
//! the debt graph builder never sees a rounding-induced mismatch from them.

use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{ParticipantRef, Split};

use super::rounding::{is_negligible, round_amount, truncate_amount};

/// Divides `amount` equally among `participants`.
///
/// Each share is rounded down to `decimal_places`. The leftover rounding
/// units go one each to the first participants in input order, and any
/// sub-unit remainder goes to the last participant.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if `config` fails validation, or
/// [`EngineError::InvalidSplit`] if `amount` is negative or `participants`
/// is empty.
///
/// # Examples
///
/// ```
/// use settle_engine::calculation::split_equally;
/// use settle_engine::config::EngineConfig;
/// use settle_engine::models::ParticipantRef;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let people: Vec<ParticipantRef> = ["a", "b", "c"]
///     .iter()
///     .map(|id| ParticipantRef { id: id.to_string(), name: id.to_uppercase() })
///     .collect();
///
/// let splits = split_equally(Decimal::from(100), &people, &EngineConfig::default()).unwrap();
/// assert_eq!(splits[0].amount, Decimal::from_str("33.34").unwrap());
/// assert_eq!(splits[1].amount, Decimal::from_str("33.33").unwrap());
/// assert_eq!(splits[2].amount, Decimal::from_str("33.33").unwrap());
/// ```
pub fn split_equally(
    amount: Decimal,
    participants: &[ParticipantRef],
    config: &EngineConfig,
) -> EngineResult<Vec<Split>> {
    config.validate()?;
    if amount < Decimal::ZERO {
        return Err(EngineError::InvalidSplit {
            message: format!("amount must not be negative, got {}", amount),
        });
    }
    if participants.is_empty() {
        return Err(EngineError::InvalidSplit {
            message: "at least one participant is required".to_string(),
        });
    }

    let unit = config.rounding_unit();
    let count = Decimal::from(participants.len());
    let share = truncate_amount(amount / count, config.decimal_places);
    let remainder = amount - share * count;
    let mut extra_units = truncate_amount(remainder / unit, 0);
    let mut allocated = Decimal::ZERO;

    let mut splits: Vec<Split> = participants
        .iter()
        .map(|participant| {
            let mut portion = share;
            if extra_units > Decimal::ZERO {
                portion += unit;
                extra_units -= Decimal::ONE;
            }
            allocated += portion;
            Split::new(participant.id.clone(), participant.name.clone(), portion)
        })
        .collect();

    if let Some(last) = splits.last_mut() {
        last.amount += amount - allocated;
    }

    Ok(splits)
}

/// Divides `amount` according to percentage shares.
///
/// Each portion is `amount * percentage / 100` rounded to `decimal_places`;
/// the last portion takes whatever rounding left over.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if `config` fails validation.
/// Returns [`EngineError::InvalidSplit`] if `amount` or any percentage is
/// negative, `shares` is empty, or the percentages do not sum to 100
/// within tolerance.
///
/// # Examples
///
/// ```
/// use settle_engine::calculation::split_by_percentage;
/// use settle_engine::config::EngineConfig;
/// use settle_engine::models::ParticipantRef;
/// use rust_decimal::Decimal;
///
/// let shares = vec![
///     (ParticipantRef { id: "a".into(), name: "A".into() }, Decimal::from(70)),
///     (ParticipantRef { id: "b".into(), name: "B".into() }, Decimal::from(30)),
/// ];
/// let splits = split_by_percentage(Decimal::from(50), &shares, &EngineConfig::default()).unwrap();
/// assert_eq!(splits[0].amount, Decimal::from(35));
/// assert_eq!(splits[1].amount, Decimal::from(15));
/// ```
pub fn split_by_percentage(
    amount: Decimal,
    shares: &[(ParticipantRef, Decimal)],
    config: &EngineConfig,
) -> EngineResult<Vec<Split>> {
    config.validate()?;
    if amount < Decimal::ZERO {
        return Err(EngineError::InvalidSplit {
            message: format!("amount must not be negative, got {}", amount),
        });
    }
    if shares.is_empty() {
        return Err(EngineError::InvalidSplit {
            message: "at least one share is required".to_string(),
        });
    }
    if let Some((participant, percentage)) = shares.iter().find(|(_, p)| *p < Decimal::ZERO) {
        return Err(EngineError::InvalidSplit {
            message: format!(
                "percentage for '{}' must not be negative, got {}",
                participant.id, percentage
            ),
        });
    }

    let total_percentage: Decimal = shares.iter().map(|(_, p)| *p).sum();
    if !is_negligible(total_percentage - Decimal::ONE_HUNDRED, config.tolerance) {
        return Err(EngineError::InvalidSplit {
            message: format!("percentages must sum to 100, got {}", total_percentage),
        });
    }

    let mut allocated = Decimal::ZERO;
    let mut splits: Vec<Split> = shares
        .iter()
        .map(|(participant, percentage)| {
            let portion = round_amount(
                amount * *percentage / Decimal::ONE_HUNDRED,
                config.decimal_places,
            );
            allocated += portion;
            Split::new(participant.id.clone(), participant.name.clone(), portion)
        })
        .collect();

    if let Some(last) = splits.last_mut() {
        last.amount += amount - allocated;
    }

    Ok(splits)
}
