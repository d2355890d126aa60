//! Calculation logic for the settlement engine.
//!
//! This module contains the four core stages and the helpers around them:
//! debt graph construction from expense splits, reduction of that graph
//! into net balances, greedy settlement planning, spending distribution
//! analysis, split generation for new expenses, display-name annotation,
//! and the `settle_group` pipeline that runs the settlement stages with an
//! audit trace.
//!
//! Every function is synchronous and pure apart from `tracing` output.

mod annotation;
mod balance_reducer;
mod debt_graph;
mod distribution_analyzer;
mod pipeline;
mod rounding;
mod settlement_planner;
mod split_helpers;

pub use annotation::{annotate_distribution, annotate_plan};
pub use balance_reducer::{net_balances, reduce_to_balances};
pub use debt_graph::{build_debt_graph, validate_expense};
pub use distribution_analyzer::{analyze_distribution, percentage_of};
pub use pipeline::{ENGINE_VERSION, settle_group};
pub use rounding::{is_negligible, round_amount};
pub use settlement_planner::{plan_settlement, plan_settlement_detailed};
pub use split_helpers::{split_by_percentage, split_equally};
