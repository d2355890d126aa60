//! Spending distribution summaries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One bucket of a spending breakdown.
///
/// `key` is a payer id in a by-user breakdown and a category name in a
/// by-category breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    /// The bucket key.
    pub key: String,
    /// Total amount attributed to the bucket.
    pub amount: Decimal,
    /// Share of the overall total, in percent. Zero when the total is zero.
    pub percentage: Decimal,
}

/// Spending aggregated by payer and by category.
///
/// Entries appear in order of first occurrence in the expense list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Spending per payer.
    pub by_user: Vec<DistributionEntry>,
    /// Spending per category.
    pub by_category: Vec<DistributionEntry>,
    /// Sum of every expense amount.
    pub total_amount: Decimal,
}

/// A by-user bucket with the payer's display name attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDistributionEntry {
    /// The payer id.
    pub user_id: String,
    /// The payer's display name.
    pub name: String,
    /// Total amount paid.
    pub amount: Decimal,
    /// Share of the overall total, in percent.
    pub percentage: Decimal,
}

/// A [`DistributionSummary`] with payer names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDistribution {
    /// Spending per payer.
    pub by_user: Vec<UserDistributionEntry>,
    /// Spending per category.
    pub by_category: Vec<DistributionEntry>,
    /// Sum of every expense amount.
    pub total_amount: Decimal,
}
