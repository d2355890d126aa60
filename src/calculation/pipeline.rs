//! End-to-end settlement pipeline.
//!
//! Runs debt graph construction, balance reduction and settlement planning
//! over one snapshot of expenses and records an audit step per stage.

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{AuditStep, AuditTrace, AuditWarning, ExpenseRecord, SettlementReport};

use super::balance_reducer::reduce_to_balances;
use super::debt_graph::build_debt_graph;
use super::settlement_planner::plan_settlement_detailed;

/// The version of the engine, recorded on every report.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Computes the settlement plan for a group's expenses.
///
/// The caller must hand over a consistent snapshot; the engine never
/// re-reads or locks a data store, so the report reflects exactly the
/// records passed in.
///
/// # Errors
///
/// Propagates the errors of [`build_debt_graph`](super::build_debt_graph)
/// and [`plan_settlement`](super::plan_settlement).
///
/// # Examples
///
/// ```
/// use settle_engine::calculation::settle_group;
/// use settle_engine::config::EngineConfig;
///
/// let report = settle_group(&[], &EngineConfig::default()).unwrap();
/// assert!(report.instructions.is_empty());
/// assert_eq!(report.audit_trace.steps.len(), 3);
/// ```
pub fn settle_group(
    expenses: &[ExpenseRecord],
    config: &EngineConfig,
) -> EngineResult<SettlementReport> {
    let start_time = Instant::now();
    let mut steps: Vec<AuditStep> = Vec::with_capacity(3);
    let mut warnings: Vec<AuditWarning> = Vec::new();

    // Step 1: pairwise obligations
    let edges = build_debt_graph(expenses, config)?;
    let obligation_total: Decimal = edges.iter().map(|e| e.amount).sum();
    let settled_split_count = expenses
        .iter()
        .flat_map(|e| e.splits.iter())
        .filter(|s| s.settled)
        .count();
    steps.push(AuditStep {
        step_number: 1,
        rule_id: "debt_graph".to_string(),
        rule_name: "Debt Graph Construction".to_string(),
        input: serde_json::json!({
            "expense_count": expenses.len(),
            "settled_split_count": settled_split_count,
            "exclude_settled_splits": config.exclude_settled_splits
        }),
        output: serde_json::json!({
            "edge_count": edges.len(),
            "obligation_total": obligation_total.normalize().to_string()
        }),
        reasoning: format!(
            "{} expenses produced {} debtor-to-creditor edges totalling {}",
            expenses.len(),
            edges.len(),
            obligation_total.normalize()
        ),
    });
    if config.exclude_settled_splits && settled_split_count > 0 {
        warnings.push(AuditWarning {
            code: "SETTLED_SPLITS_EXCLUDED".to_string(),
            message: format!(
                "{} settled splits were left out of the debt graph",
                settled_split_count
            ),
            severity: "low".to_string(),
        });
    }

    // Step 2: net balances
    let balances = reduce_to_balances(&edges);
    let unsettled = balances.count_unsettled(config.tolerance);
    steps.push(AuditStep {
        step_number: 2,
        rule_id: "balance_reduction".to_string(),
        rule_name: "Balance Reduction".to_string(),
        input: serde_json::json!({
            "edge_count": edges.len()
        }),
        output: serde_json::json!({
            "participant_count": balances.len(),
            "unsettled_count": unsettled,
            "balance_sum": balances.total().normalize().to_string()
        }),
        reasoning: format!(
            "Netted {} edges into {} balances, {} outside tolerance {}",
            edges.len(),
            balances.len(),
            unsettled,
            config.tolerance.normalize()
        ),
    });

    // Step 3: payments
    let plan = plan_settlement_detailed(&balances, config)?;
    steps.push(AuditStep {
        step_number: 3,
        rule_id: "settlement_plan".to_string(),
        rule_name: "Greedy Settlement Planning".to_string(),
        input: serde_json::json!({
            "unsettled_count": plan.unsettled_participants,
            "tolerance": config.tolerance.normalize().to_string(),
            "decimal_places": config.decimal_places
        }),
        output: serde_json::json!({
            "instruction_count": plan.instructions.len(),
            "reinstated_count": plan.reinstated_participants,
            "absorbed_residual": plan.absorbed_residual.normalize().to_string()
        }),
        reasoning: format!(
            "Largest debtor pays largest creditor: {} payments settle {} participants",
            plan.instructions.len(),
            plan.unsettled_participants
        ),
    });
    if !plan.absorbed_residual.is_zero() {
        warnings.push(AuditWarning {
            code: "RESIDUAL_ABSORBED".to_string(),
            message: format!(
                "{} of rounding residual was folded into final payments",
                plan.absorbed_residual.normalize()
            ),
            severity: "low".to_string(),
        });
    }

    let duration_us = start_time.elapsed().as_micros() as u64;
    let report = SettlementReport {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        expense_count: expenses.len(),
        edges,
        balances,
        instructions: plan.instructions,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us,
        },
    };

    debug!(calculation_id = %report.calculation_id, "Built settlement report");
    info!(
        expenses = report.expense_count,
        instructions = report.instructions.len(),
        duration_us,
        "Settlement calculated"
    );

    Ok(report)
}
