//! Debt settlement and spending analytics for shared group expenses.
//!
//! This crate turns a snapshot of expense records into pairwise debts, net
//! balances and a short list of payments that settles the group, and
//! summarizes spending by payer and by category. The core is synchronous
//! and keeps no state between calls; [`api`] exposes it over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
