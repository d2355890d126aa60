//! Expense and split records.
//!
//! These are owned by the persistence layer. The engine only reads them and
//! never mutates a record it has been handed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The portion of one expense attributed to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Opaque id of the participant who owes this portion.
    pub participant_id: String,
    /// Display name recorded alongside the split.
    #[serde(default)]
    pub participant_name: String,
    /// The amount attributed to the participant.
    pub amount: Decimal,
    /// Whether the participant has already paid this portion back.
    #[serde(default)]
    pub settled: bool,
}

impl Split {
    /// Creates an unsettled split.
    pub fn new(
        participant_id: impl Into<String>,
        participant_name: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            participant_name: participant_name.into(),
            amount,
            settled: false,
        }
    }
}

/// A single shared expense paid by one participant.
///
/// # Example
///
/// ```
/// use settle_engine::models::{ExpenseRecord, Split};
/// use chrono::Utc;
/// use rust_decimal::Decimal;
///
/// let expense = ExpenseRecord {
///     id: "exp_001".to_string(),
///     payer_id: "u_x".to_string(),
///     payer_name: "Xavier".to_string(),
///     amount: Decimal::from(90),
///     splits: vec![
///         Split::new("u_x", "Xavier", Decimal::from(30)),
///         Split::new("u_y", "Yuki", Decimal::from(30)),
///         Split::new("u_z", "Zoe", Decimal::from(30)),
///     ],
///     category: "Food".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(expense.split_total(), Decimal::from(90));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique identifier of the expense.
    pub id: String,
    /// Opaque id of the participant who paid.
    pub payer_id: String,
    /// Display name of the payer.
    #[serde(default)]
    pub payer_name: String,
    /// Total amount paid.
    pub amount: Decimal,
    /// How the amount is divided among participants.
    pub splits: Vec<Split>,
    /// Spending category (e.g. "Food", "Travel").
    #[serde(default)]
    pub category: String,
    /// When the expense was recorded.
    pub timestamp: DateTime<Utc>,
}

impl ExpenseRecord {
    /// Returns the sum of every split amount, settled or not.
    pub fn split_total(&self) -> Decimal {
        self.splits.iter().map(|s| s.amount).sum()
    }
}
