//! Core data models for the settlement engine.
//!
//! Every structure here is a plain value built fresh for a single call and
//! discarded afterwards; the engine keeps no state between calls.

mod distribution;
mod expense;
mod ledger;
mod participant;
mod report;
mod settlement;

pub use distribution::{
    AnnotatedDistribution, DistributionEntry, DistributionSummary, UserDistributionEntry,
};
pub use expense::{ExpenseRecord, Split};
pub use ledger::{Balances, Edge};
pub use participant::ParticipantDirectory;
pub use report::{AuditStep, AuditTrace, AuditWarning, SettlementReport};
pub use settlement::{
    AnnotatedInstruction, ParticipantRef, SettlementInstruction, SettlementPlan,
};
