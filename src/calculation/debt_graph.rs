//! Debt graph construction.
//!
//! Turns expense records into directed, weighted obligations
//! `debtor → creditor`, one edge per ordered pair.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Edge, ExpenseRecord};

use super::rounding::is_negligible;

/// Builds the pairwise debt graph for a set of expenses.
///
/// Every split whose participant differs from the payer becomes an
/// obligation from that participant to the payer. Obligations for the same
/// ordered `(debtor, creditor)` pair are summed across expenses; opposite
/// directions are kept apart, since netting is left to
/// [`reduce_to_balances`](super::reduce_to_balances). Edges whose summed
/// amount is within tolerance are dropped. Edges are returned in order of
/// first occurrence.
///
/// With `exclude_settled_splits` enabled, settled splits produce no edge.
/// Split-sum validation always considers every split.
///
/// # Errors
///
/// - [`EngineError::InvalidConfig`] if `config` fails validation
/// - [`EngineError::InvalidExpense`] if an expense or split amount is negative
/// - [`EngineError::DataIntegrity`] if an expense's splits do not sum to its
///   amount within tolerance
///
/// # Examples
///
/// ```
/// use settle_engine::calculation::build_debt_graph;
/// use settle_engine::config::EngineConfig;
/// use settle_engine::models::{ExpenseRecord, Split};
/// use chrono::Utc;
/// use rust_decimal::Decimal;
///
/// let expense = ExpenseRecord {
///     id: "exp_001".to_string(),
///     payer_id: "x".to_string(),
///     payer_name: "X".to_string(),
///     amount: Decimal::from(90),
///     splits: vec![
///         Split::new("x", "X", Decimal::from(30)),
///         Split::new("y", "Y", Decimal::from(30)),
///         Split::new("z", "Z", Decimal::from(30)),
///     ],
///     category: "Food".to_string(),
///     timestamp: Utc::now(),
/// };
///
/// let edges = build_debt_graph(&[expense], &EngineConfig::default()).unwrap();
/// assert_eq!(edges.len(), 2);
/// assert!(edges.iter().all(|e| e.creditor_id == "x"));
/// ```
pub fn build_debt_graph(
    expenses: &[ExpenseRecord],
    config: &EngineConfig,
) -> EngineResult<Vec<Edge>> {
    config.validate()?;

    let mut edges: Vec<Edge> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut skipped_settled = 0usize;

    for expense in expenses {
        validate_expense(expense, config)?;

        for split in &expense.splits {
            if split.participant_id == expense.payer_id {
                continue;
            }
            if split.settled && config.exclude_settled_splits {
                skipped_settled += 1;
                continue;
            }

            let key = (split.participant_id.as_str(), expense.payer_id.as_str());
            match index.get(&key) {
                Some(&position) => edges[position].amount += split.amount,
                None => {
                    index.insert(key, edges.len());
                    edges.push(Edge {
                        debtor_id: split.participant_id.clone(),
                        creditor_id: expense.payer_id.clone(),
                        amount: split.amount,
                    });
                }
            }
        }
    }

    let candidate_count = edges.len();
    edges.retain(|edge| {
        let negligible = is_negligible(edge.amount, config.tolerance);
        if negligible {
            warn!(
                debtor_id = %edge.debtor_id,
                creditor_id = %edge.creditor_id,
                amount = %edge.amount,
                "Dropped obligation within tolerance"
            );
        }
        !negligible
    });

    debug!(
        expenses = expenses.len(),
        edges = edges.len(),
        dropped = candidate_count - edges.len(),
        skipped_settled,
        "Built debt graph"
    );

    Ok(edges)
}

/// Checks the amounts of one expense before it contributes any edge.
pub fn validate_expense(expense: &ExpenseRecord, config: &EngineConfig) -> EngineResult<()> {
    if expense.amount < Decimal::ZERO {
        return Err(EngineError::InvalidExpense {
            expense_id: expense.id.clone(),
            message: format!("amount must not be negative, got {}", expense.amount),
        });
    }

    if let Some(split) = expense
        .splits
        .iter()
        .find(|s| s.amount < Decimal::ZERO)
    {
        return Err(EngineError::InvalidExpense {
            expense_id: expense.id.clone(),
            message: format!(
                "split for '{}' must not be negative, got {}",
                split.participant_id, split.amount
            ),
        });
    }

    let split_total = expense.split_total();
    if !is_negligible(split_total - expense.amount, config.tolerance) {
        return Err(EngineError::DataIntegrity {
            expense_id: expense.id.clone(),
            split_total,
            amount: expense.amount,
        });
    }

    Ok(())
}
