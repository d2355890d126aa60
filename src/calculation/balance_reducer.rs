//! Balance reduction.
//!
//! Collapses the pairwise debt graph into one signed net amount per
//! participant. Reciprocal and circular debts cancel here without any
//! explicit cycle detection.

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{Balances, Edge, ExpenseRecord};

use super::debt_graph::build_debt_graph;

/// Reduces pairwise edges to net balances.
///
/// Every participant named by an edge starts at zero; each edge then
/// subtracts its amount from the debtor and adds it to the creditor. Since
/// every edge contributes `+amount` and `-amount` exactly once, the balances
/// always sum to zero.
///
/// # Examples
///
/// ```
/// use settle_engine::calculation::reduce_to_balances;
/// use settle_engine::models::Edge;
/// use rust_decimal::Decimal;
///
/// let edges = vec![
///     Edge { debtor_id: "a".into(), creditor_id: "b".into(), amount: Decimal::from(10) },
///     Edge { debtor_id: "b".into(), creditor_id: "c".into(), amount: Decimal::from(10) },
///     Edge { debtor_id: "c".into(), creditor_id: "a".into(), amount: Decimal::from(10) },
/// ];
///
/// let balances = reduce_to_balances(&edges);
/// assert_eq!(balances.len(), 3);
/// assert!(balances.is_settled(Decimal::ZERO));
/// ```
pub fn reduce_to_balances(edges: &[Edge]) -> Balances {
    let mut balances = Balances::new();

    for edge in edges {
        balances.adjust(&edge.debtor_id, -edge.amount);
        balances.adjust(&edge.creditor_id, edge.amount);
    }

    debug!(
        edges = edges.len(),
        participants = balances.len(),
        "Reduced debt graph to balances"
    );

    balances
}

/// Builds the debt graph for `expenses` and reduces it in one call.
pub fn net_balances(expenses: &[ExpenseRecord], config: &EngineConfig) -> EngineResult<Balances> {
    let edges = build_debt_graph(expenses, config)?;
    Ok(reduce_to_balances(&edges))
}
