//! Spending distribution analysis.
//!
//! Aggregates the raw expense records by payer and by category. This stage
//! is independent of the settlement pipeline and can run alongside it.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{DistributionEntry, DistributionSummary, ExpenseRecord};

/// Amounts keyed by bucket, remembering first-occurrence order.
#[derive(Debug, Default)]
struct Buckets {
    entries: Vec<(String, Decimal)>,
    index: HashMap<String, usize>,
}

impl Buckets {
    fn add(&mut self, key: &str, amount: Decimal) {
        match self.index.get(key) {
            Some(&position) => self.entries[position].1 += amount,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), amount));
            }
        }
    }

    fn into_entries(self, total_amount: Decimal) -> Vec<DistributionEntry> {
        self.entries
            .into_iter()
            .map(|(key, amount)| DistributionEntry {
                percentage: percentage_of(amount, total_amount),
                key,
                amount,
            })
            .collect()
    }
}

/// Returns `amount` as a percentage of `total`, or zero when `total` is zero.
///
/// # Examples
///
/// ```
/// use settle_engine::calculation::percentage_of;
/// use rust_decimal::Decimal;
///
/// assert_eq!(percentage_of(Decimal::from(25), Decimal::from(200)), Decimal::new(125, 1));
/// assert_eq!(percentage_of(Decimal::from(25), Decimal::ZERO), Decimal::ZERO);
/// ```
pub fn percentage_of(amount: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    amount / total * Decimal::ONE_HUNDRED
}

/// Summarizes spending by payer and by category.
///
/// Spending is attributed to whoever paid an expense, not to the
/// participants who owe shares of it. Expenses recorded without a category
/// are grouped under `config.default_category`. Buckets keep the order in
/// which their key first appears.
///
/// # Examples
///
/// ```
/// use settle_engine::calculation::analyze_distribution;
/// use settle_engine::config::EngineConfig;
///
/// let summary = analyze_distribution(&[], &EngineConfig::default());
/// assert!(summary.by_user.is_empty());
/// assert!(summary.by_category.is_empty());
/// assert!(summary.total_amount.is_zero());
/// ```
pub fn analyze_distribution(
    expenses: &[ExpenseRecord],
    config: &EngineConfig,
) -> DistributionSummary {
    let mut by_user = Buckets::default();
    let mut by_category = Buckets::default();
    let mut total_amount = Decimal::ZERO;

    for expense in expenses {
        total_amount += expense.amount;
        by_user.add(&expense.payer_id, expense.amount);

        let category = if expense.category.trim().is_empty() {
            config.default_category.as_str()
        } else {
            expense.category.as_str()
        };
        by_category.add(category, expense.amount);
    }

    debug!(
        expenses = expenses.len(),
        payers = by_user.entries.len(),
        categories = by_category.entries.len(),
        total_amount = %total_amount,
        "Analyzed expense distribution"
    );

    DistributionSummary {
        by_user: by_user.into_entries(total_amount),
        by_category: by_category.into_entries(total_amount),
        total_amount,
    }
}
