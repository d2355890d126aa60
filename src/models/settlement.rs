//! Settlement instructions produced by the planner.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single payment `from_id → to_id` that reduces outstanding balances.
///
/// The planner never emits an instruction with `from_id == to_id` or a
/// non-positive amount.
///
/// # Example
///
/// ```
/// use settle_engine::models::SettlementInstruction;
/// use rust_decimal::Decimal;
///
/// let instruction = SettlementInstruction::new("u_y", "u_x", Decimal::from(30));
/// assert_eq!(instruction.from_id, "u_y");
/// assert_eq!(instruction.to_id, "u_x");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementInstruction {
    /// The participant who pays.
    pub from_id: String,
    /// The participant who receives the payment.
    pub to_id: String,
    /// The amount to transfer.
    pub amount: Decimal,
}

impl SettlementInstruction {
    /// Creates a new instruction.
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            amount,
        }
    }
}

/// The planner's full output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// Payments that zero out every balance, in emission order.
    pub instructions: Vec<SettlementInstruction>,
    /// Number of participants the plan had to settle, reinstated ones included.
    pub unsettled_participants: usize,
    /// Participants within tolerance that were brought back because,
    /// together, they held more than tolerance.
    pub reinstated_participants: usize,
    /// Rounding residual folded into the final instructions, if any.
    pub absorbed_residual: Decimal,
}

/// A participant id paired with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRef {
    /// Opaque participant id.
    pub id: String,
    /// Display name resolved from the participant directory.
    pub name: String,
}

/// A settlement instruction with display names attached, ready to present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedInstruction {
    /// The participant who pays.
    pub from: ParticipantRef,
    /// The participant who receives the payment.
    pub to: ParticipantRef,
    /// The amount to transfer.
    pub amount: Decimal,
}
