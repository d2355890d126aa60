//! Settlement report models.
//!
//! This module contains the [`SettlementReport`] type and the audit trace
//! structures that record how each stage of the pipeline reached its output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Balances, Edge, SettlementInstruction};

/// A single step in the audit trace recording one pipeline stage.
///
/// Each step captures a summary of the stage input and output together
/// with a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number, starting at 1.
    pub step_number: u32,
    /// Machine-readable identifier of the stage.
    pub rule_id: String,
    /// Human-readable name of the stage.
    pub rule_name: String,
    /// Summary of the stage input.
    pub input: serde_json::Value,
    /// Summary of the stage output.
    pub output: serde_json::Value,
    /// Human-readable explanation of the outcome.
    pub reasoning: String,
}

/// A condition worth surfacing that did not stop the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for one settlement calculation.
///
/// # Example
///
/// ```
/// use settle_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 42,
/// };
/// assert!(trace.steps.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of pipeline steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings raised along the way.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The result of running the whole settlement pipeline over one snapshot
/// of expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Number of expenses in the snapshot.
    pub expense_count: usize,
    /// Aggregated pairwise obligations.
    pub edges: Vec<Edge>,
    /// Net balance per participant.
    pub balances: Balances,
    /// Payments that settle every balance.
    pub instructions: Vec<SettlementInstruction>,
    /// How the result was reached.
    pub audit_trace: AuditTrace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_warning_serialization() {
        let warning = AuditWarning {
            code: "RESIDUAL_ABSORBED".to_string(),
            message: "0.01 folded into the last payment".to_string(),
            severity: "low".to_string(),
        };
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"code\":\"RESIDUAL_ABSORBED\""));
        assert!(json.contains("\"severity\":\"low\""));
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = SettlementReport {
            calculation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: "0.1.0".to_string(),
            expense_count: 0,
            edges: vec![],
            balances: Balances::new(),
            instructions: vec![],
            audit_trace: AuditTrace {
                steps: vec![],
                warnings: vec![],
                duration_us: 7,
            },
        };
        let json = serde_json::to_string(&report).unwrap();
        let parsed: SettlementReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
