//! Debt graph edges and per-participant balances.

use std::collections::BTreeMap;
use std::collections::btree_map;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::SettlementInstruction;

/// One directed obligation: `debtor_id` owes `creditor_id` the `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// The participant who owes money.
    pub debtor_id: String,
    /// The participant who is owed money.
    pub creditor_id: String,
    /// The amount owed, always positive.
    pub amount: Decimal,
}

/// Signed net amount per participant.
///
/// Positive means the participant is owed money (net creditor), negative
/// means they owe money (net debtor). Entries are kept ordered by
/// participant id, which gives every consumer a deterministic iteration
/// order.
///
/// # Example
///
/// ```
/// use settle_engine::models::Balances;
/// use rust_decimal::Decimal;
///
/// let mut balances = Balances::new();
/// balances.adjust("u_x", Decimal::from(60));
/// balances.adjust("u_y", Decimal::from(-30));
/// balances.adjust("u_z", Decimal::from(-30));
///
/// assert_eq!(balances.get("u_x"), Decimal::from(60));
/// assert_eq!(balances.total(), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balances(BTreeMap<String, Decimal>);

impl Balances {
    /// Creates an empty balance vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to a participant's balance, registering them if needed.
    pub fn adjust(&mut self, participant_id: &str, delta: Decimal) {
        match self.0.get_mut(participant_id) {
            Some(balance) => *balance += delta,
            None => {
                self.0.insert(participant_id.to_string(), delta);
            }
        }
    }

    /// Returns a participant's balance, or zero if they are unknown.
    pub fn get(&self, participant_id: &str) -> Decimal {
        self.0.get(participant_id).copied().unwrap_or(Decimal::ZERO)
    }

    /// Returns the sum of all balances.
    pub fn total(&self) -> Decimal {
        self.0.values().copied().sum()
    }

    /// Returns the number of participants tracked.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no participant is tracked.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Counts participants whose balance lies outside `tolerance`.
    pub fn count_unsettled(&self, tolerance: Decimal) -> usize {
        self.0.values().filter(|b| b.abs() > tolerance).count()
    }

    /// Returns true if every balance lies within `tolerance` of zero.
    pub fn is_settled(&self, tolerance: Decimal) -> bool {
        self.count_unsettled(tolerance) == 0
    }

    /// Iterates over `(participant_id, balance)` in id order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Decimal> {
        self.0.iter()
    }

    /// Replays payment instructions and returns the resulting balances.
    ///
    /// A payer's balance rises by the amount paid and the payee's falls by
    /// the same amount.
    pub fn apply(&self, instructions: &[SettlementInstruction]) -> Self {
        let mut replayed = self.clone();
        for instruction in instructions {
            replayed.adjust(&instruction.from_id, instruction.amount);
            replayed.adjust(&instruction.to_id, -instruction.amount);
        }
        replayed
    }
}

impl FromIterator<(String, Decimal)> for Balances {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        let mut balances = Self::new();
        for (participant_id, amount) in iter {
            balances.adjust(&participant_id, amount);
        }
        balances
    }
}

impl<'a> IntoIterator for &'a Balances {
    type Item = (&'a String, &'a Decimal);
    type IntoIter = btree_map::Iter<'a, String, Decimal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
