//! Settlement planning.
//!
//! Reduces net balances to an ordered list of payments using the greedy
//! "largest debtor pays largest creditor" heuristic. Each step closes at
//! least one participant, so `n` participants with a nonzero balance need
//! at most `n - 1` payments. The result is not guaranteed to be the global
//! minimum; finding that is a subset-sum search.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Balances, SettlementInstruction, SettlementPlan};

use super::rounding::{expand_amount, is_negligible, round_amount, truncate_amount};

/// One side of an open position.
#[derive(Debug)]
struct Position {
    participant_id: String,
    /// Magnitude still to pay or receive, reduced by emitted amounts.
    remaining: Decimal,
    /// Accumulated difference between unrounded transfers and emitted amounts.
    drift: Decimal,
}

impl Position {
    fn new(participant_id: &str, remaining: Decimal) -> Self {
        Self {
            participant_id: participant_id.to_string(),
            remaining,
            drift: Decimal::ZERO,
        }
    }
}

/// Plans the payments that settle every balance.
///
/// See [`plan_settlement_detailed`] for the algorithm; this returns only the
/// instructions.
///
/// # Examples
///
/// ```
/// use settle_engine::calculation::plan_settlement;
/// use settle_engine::config::EngineConfig;
/// use settle_engine::models::Balances;
/// use rust_decimal::Decimal;
///
/// let mut balances = Balances::new();
/// balances.adjust("x", Decimal::from(60));
/// balances.adjust("y", Decimal::from(-30));
/// balances.adjust("z", Decimal::from(-30));
///
/// let plan = plan_settlement(&balances, &EngineConfig::default()).unwrap();
/// assert_eq!(plan.len(), 2);
/// assert_eq!(plan[0].from_id, "y");
/// assert_eq!(plan[0].to_id, "x");
/// assert_eq!(plan[0].amount, Decimal::from(30));
/// ```
pub fn plan_settlement(
    balances: &Balances,
    config: &EngineConfig,
) -> EngineResult<Vec<SettlementInstruction>> {
    Ok(plan_settlement_detailed(balances, config)?.instructions)
}

/// Plans the payments that settle every balance, with bookkeeping.
///
/// 1. Participants above tolerance become creditors, those below minus
///    tolerance become debtors.
/// 2. Participants within tolerance are left out one by one, but together
///    they can hold more than tolerance. While the two sides differ by more
///    than tolerance, the near-zero participants that close the gap are
///    brought back, largest magnitude first.
/// 3. While both sides are non-empty, the largest creditor is paid by the
///    largest debtor (ties go to the smaller participant id). The transfer
///    is the smaller of the two magnitudes, rounded to `decimal_places`.
/// 4. The participant whose magnitude was smaller drops out. The other one
///    stays open while at least one rounding unit is still outstanding, so
///    a cent left over is paid by the next counterparty instead of being
///    stranded.
///
/// When the transfer is not representable at the rounding scale, the
/// emitted amount is rounded up or down, whichever keeps the participant
/// that stays open closer to its unrounded position. This stops sub-unit
/// rounding from piling up on one participant. Rounding drift still left
/// outside tolerance at the end is folded into that participant's last
/// payment instead of emitting an extra sub-unit instruction. A fold never
/// exceeds one rounding unit per payment touching the participant.
///
/// # Errors
///
/// - [`EngineError::InvalidConfig`] if `config` fails validation
/// - [`EngineError::UnbalancedLedger`] if the balances do not sum to zero
///   within tolerance
pub fn plan_settlement_detailed(
    balances: &Balances,
    config: &EngineConfig,
) -> EngineResult<SettlementPlan> {
    config.validate()?;
    let tolerance = config.tolerance;
    let decimal_places = config.decimal_places;

    let residual = balances.total();
    if !is_negligible(residual, tolerance) {
        return Err(EngineError::UnbalancedLedger { residual });
    }

    let mut creditors = Vec::new();
    let mut debtors = Vec::new();
    let mut near_zero = Vec::new();
    for (participant_id, &balance) in balances {
        if balance > tolerance {
            creditors.push(Position::new(participant_id, balance));
        } else if balance < -tolerance {
            debtors.push(Position::new(participant_id, -balance));
        } else if !round_amount(balance, decimal_places).is_zero() {
            near_zero.push((participant_id.as_str(), balance));
        }
    }

    let reinstated_participants =
        reinstate_near_zero(&mut creditors, &mut debtors, near_zero, tolerance);
    let unsettled_participants = creditors.len() + debtors.len();
    let mut instructions: Vec<SettlementInstruction> =
        Vec::with_capacity(unsettled_participants.saturating_sub(1));

    while let (Some(ci), Some(di)) = (largest(&creditors), largest(&debtors)) {
        let creditor_closes = creditors[ci].remaining <= debtors[di].remaining;
        let transfer = creditors[ci].remaining.min(debtors[di].remaining);
        let open_drift = if creditor_closes {
            debtors[di].drift
        } else {
            creditors[ci].drift
        };
        let amount = choose_amount(transfer, open_drift, decimal_places);

        // Nothing payable at this scale; the smaller side is dust
        if amount <= Decimal::ZERO {
            if creditor_closes {
                creditors.swap_remove(ci);
            } else {
                debtors.swap_remove(di);
            }
            continue;
        }

        instructions.push(SettlementInstruction::new(
            debtors[di].participant_id.clone(),
            creditors[ci].participant_id.clone(),
            amount,
        ));

        creditors[ci].remaining -= amount;
        debtors[di].remaining -= amount;
        if creditor_closes {
            debtors[di].drift += transfer - amount;
        } else {
            creditors[ci].drift += transfer - amount;
        }

        if creditor_closes || !outstanding(creditors[ci].remaining, decimal_places) {
            creditors.swap_remove(ci);
        }
        if !creditor_closes || !outstanding(debtors[di].remaining, decimal_places) {
            debtors.swap_remove(di);
        }
    }

    let mut absorbed_residual = Decimal::ZERO;
    for leftover in creditors.iter().filter(|p| !is_negligible(p.remaining, tolerance)) {
        absorbed_residual +=
            absorb_leftover(&mut instructions, leftover, config, |i| &i.to_id);
    }
    for leftover in debtors.iter().filter(|p| !is_negligible(p.remaining, tolerance)) {
        absorbed_residual +=
            absorb_leftover(&mut instructions, leftover, config, |i| &i.from_id);
    }

    debug!(
        participants = balances.len(),
        unsettled = unsettled_participants,
        reinstated = reinstated_participants,
        instructions = instructions.len(),
        absorbed_residual = %absorbed_residual,
        "Planned settlement"
    );

    Ok(SettlementPlan {
        instructions,
        unsettled_participants,
        reinstated_participants,
        absorbed_residual,
    })
}

/// Moves near-zero participants into the plan until the two sides agree
/// within `tolerance`. Returns how many were moved.
///
/// Only balances whose sign closes the gap are taken, largest magnitude
/// first with the smaller id on ties. Each one is at most `tolerance`, so
/// the gap never changes sign by more than that.
fn reinstate_near_zero(
    creditors: &mut Vec<Position>,
    debtors: &mut Vec<Position>,
    mut near_zero: Vec<(&str, Decimal)>,
    tolerance: Decimal,
) -> usize {
    let owed: Decimal = creditors.iter().map(|p| p.remaining).sum();
    let owing: Decimal = debtors.iter().map(|p| p.remaining).sum();
    let mut gap = owed - owing;
    if is_negligible(gap, tolerance) {
        return 0;
    }

    near_zero.sort_by(|(a_id, a), (b_id, b)| b.abs().cmp(&a.abs()).then_with(|| a_id.cmp(b_id)));

    let mut reinstated = 0;
    for (participant_id, balance) in near_zero {
        if is_negligible(gap, tolerance) {
            break;
        }
        if gap > Decimal::ZERO && balance < Decimal::ZERO {
            debtors.push(Position::new(participant_id, -balance));
        } else if gap < Decimal::ZERO && balance > Decimal::ZERO {
            creditors.push(Position::new(participant_id, balance));
        } else {
            continue;
        }
        gap += balance;
        reinstated += 1;
    }

    if !is_negligible(gap, tolerance) {
        warn!(gap = %gap, "Near-zero balances could not close the settlement gap");
    }
    reinstated
}

/// Index of the position with the largest magnitude, smallest id on ties.
fn largest(positions: &[Position]) -> Option<usize> {
    positions
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            a.remaining
                .cmp(&b.remaining)
                .then_with(|| b.participant_id.cmp(&a.participant_id))
        })
        .map(|(index, _)| index)
}

/// Whether a position still has a payable amount at the rounding scale.
fn outstanding(remaining: Decimal, decimal_places: u32) -> bool {
    round_amount(remaining, decimal_places) > Decimal::ZERO
}

/// Rounds `transfer` to the scale, picking the neighbour that leaves the
/// open side's drift smallest. Prefers plain rounding on ties.
fn choose_amount(transfer: Decimal, open_drift: Decimal, decimal_places: u32) -> Decimal {
    let nearest = round_amount(transfer, decimal_places);
    let other = if nearest > transfer {
        truncate_amount(transfer, decimal_places)
    } else {
        expand_amount(transfer, decimal_places)
    };

    let drift_with = |amount: Decimal| (open_drift + transfer - amount).abs();
    if drift_with(other) < drift_with(nearest) {
        other
    } else {
        nearest
    }
}

/// Folds a leftover position into the last instruction that touches it.
///
/// Only rounding drift is folded: at most one rounding unit for every
/// payment that touches the participant. A larger leftover stays put, since
/// adding it would charge the counterparty for somebody else's balance.
fn absorb_leftover<F>(
    instructions: &mut [SettlementInstruction],
    leftover: &Position,
    config: &EngineConfig,
    party: F,
) -> Decimal
where
    F: Fn(&SettlementInstruction) -> &String,
{
    let adjustment = round_amount(leftover.remaining, config.decimal_places);
    let touching = instructions
        .iter()
        .filter(|instruction| *party(instruction) == leftover.participant_id)
        .count();
    let drift_limit = config.rounding_unit() * Decimal::from(touching);

    if adjustment.abs() > drift_limit {
        warn!(
            participant_id = %leftover.participant_id,
            residual = %leftover.remaining,
            payments = touching,
            "Residual exceeds rounding drift, left unsettled"
        );
        return Decimal::ZERO;
    }

    match instructions
        .iter_mut()
        .rev()
        .find(|instruction| *party(instruction) == leftover.participant_id)
    {
        Some(instruction) => {
            instruction.amount += adjustment;
            warn!(
                participant_id = %leftover.participant_id,
                residual = %adjustment,
                "Folded settlement residual into final payment"
            );
            adjustment
        }
        None => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn balances(entries: &[(&str, &str)]) -> Balances {
        entries
            .iter()
            .map(|(id, amount)| (id.to_string(), dec(amount)))
            .collect()
    }

    fn assert_well_formed(instructions: &[SettlementInstruction], decimal_places: u32) {
        for instruction in instructions {
            assert_ne!(instruction.from_id, instruction.to_id);
            assert!(instruction.amount > Decimal::ZERO);
            assert_eq!(instruction.amount, instruction.amount.round_dp(decimal_places));
        }
    }

    #[test]
    fn test_three_way_split() {
        let input = balances(&[("x", "60"), ("y", "-30"), ("z", "-30")]);
        let plan = plan_settlement(&input, &EngineConfig::default()).unwrap();

        assert_eq!(
            plan,
            vec![
                SettlementInstruction::new("y", "x", dec("30")),
                SettlementInstruction::new("z", "x", dec("30")),
            ]
        );
    }

    #[test]
    fn test_settled_balances_yield_empty_plan() {
        let input = balances(&[("a", "0"), ("b", "0.005"), ("c", "-0.005")]);
        let plan = plan_settlement_detailed(&input, &EngineConfig::default()).unwrap();

        assert!(plan.instructions.is_empty());
        assert_eq!(plan.unsettled_participants, 0);
    }

    #[test]
    fn test_empty_balances_yield_empty_plan() {
        let plan = plan_settlement(&Balances::new(), &EngineConfig::default()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_unbalanced_input_is_rejected() {
        let input = balances(&[("a", "10"), ("b", "-5")]);
        match plan_settlement(&input, &EngineConfig::default()) {
            Err(EngineError::UnbalancedLedger { residual }) => assert_eq!(residual, dec("5")),
            other => panic!("expected UnbalancedLedger, got {:?}", other),
        }
    }

    #[test]
    fn test_largest_pairs_are_matched_first() {
        let input = balances(&[("a", "50"), ("b", "30"), ("c", "-20"), ("d", "-60")]);
        let plan = plan_settlement(&input, &EngineConfig::default()).unwrap();

        assert_eq!(
            plan,
            vec![
                SettlementInstruction::new("d", "a", dec("50")),
                SettlementInstruction::new("c", "b", dec("20")),
                SettlementInstruction::new("d", "b", dec("10")),
            ]
        );
    }

    #[test]
    fn test_ties_break_on_participant_id() {
        let input = balances(&[("b", "10"), ("a", "10"), ("d", "-10"), ("c", "-10")]);
        let plan = plan_settlement(&input, &EngineConfig::default()).unwrap();

        assert_eq!(
            plan,
            vec![
                SettlementInstruction::new("c", "a", dec("10")),
                SettlementInstruction::new("d", "b", dec("10")),
            ]
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let input = balances(&[
            ("m", "12.40"),
            ("n", "12.40"),
            ("o", "-8.20"),
            ("p", "-8.20"),
            ("q", "-8.40"),
        ]);
        let config = EngineConfig::default();
        let first = plan_settlement(&input, &config).unwrap();
        let second = plan_settlement(&input, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_instruction_count_bound() {
        let input = balances(&[
            ("a", "100"),
            ("b", "-10"),
            ("c", "-20"),
            ("d", "-30"),
            ("e", "-40"),
        ]);
        let plan = plan_settlement(&input, &EngineConfig::default()).unwrap();
        assert!(plan.len() <= 4);
        assert!(input.apply(&plan).is_settled(dec("0.01")));
    }

    #[test]
    fn test_thirds_settle_within_tolerance() {
        let input = balances(&[("x", "66.667"), ("y", "-33.333"), ("z", "-33.334")]);
        let config = EngineConfig::default();
        let plan = plan_settlement(&input, &config).unwrap();

        assert_eq!(plan.len(), 2);
        assert_well_formed(&plan, 2);
        assert!(input.apply(&plan).is_settled(config.tolerance));
    }

    #[test]
    fn test_rounding_drift_does_not_accumulate() {
        // each debtor owes half a cent less than a rounding unit boundary
        let input = balances(&[
            ("c", "2.016"),
            ("d1", "-0.504"),
            ("d2", "-0.504"),
            ("d3", "-0.504"),
            ("d4", "-0.504"),
        ]);
        let config = EngineConfig::default();
        let plan = plan_settlement_detailed(&input, &config).unwrap();

        assert_eq!(plan.instructions.len(), 4);
        assert_eq!(plan.absorbed_residual, Decimal::ZERO);
        assert_well_formed(&plan.instructions, 2);
        assert!(input.apply(&plan.instructions).is_settled(config.tolerance));
    }

    #[test]
    fn test_near_zero_participants_close_the_gap() {
        // c and d sit inside tolerance, but together the creditor is two
        // cents short without them
        let input = balances(&[("a", "1.02"), ("b", "-1.00"), ("c", "-0.01"), ("d", "-0.01")]);
        let config = EngineConfig::default();
        let plan = plan_settlement_detailed(&input, &config).unwrap();

        assert_eq!(
            plan.instructions,
            vec![
                SettlementInstruction::new("b", "a", dec("1.00")),
                SettlementInstruction::new("c", "a", dec("0.01")),
            ]
        );
        assert_eq!(plan.reinstated_participants, 1);
        assert_eq!(plan.unsettled_participants, 3);
        assert_eq!(plan.absorbed_residual, Decimal::ZERO);

        let after = input.apply(&plan.instructions);
        assert_eq!(after.get("b"), Decimal::ZERO);
        assert!(after.is_settled(config.tolerance));
    }

    #[test]
    fn test_many_near_zero_debtors_do_not_burden_one_payer() {
        let mut entries = vec![("a".to_string(), dec("1.10")), ("b".to_string(), dec("-1.00"))];
        entries.extend((0..10).map(|i| (format!("d{}", i), dec("-0.01"))));
        let input: Balances = entries.into_iter().collect();
        let config = EngineConfig::default();
        let plan = plan_settlement_detailed(&input, &config).unwrap();

        assert_eq!(plan.instructions[0], SettlementInstruction::new("b", "a", dec("1.00")));
        assert_eq!(plan.instructions.len(), 10);
        assert_eq!(plan.reinstated_participants, 9);
        assert_eq!(plan.absorbed_residual, Decimal::ZERO);
        assert!(plan.instructions.iter().all(|i| i.to_id == "a"));
        assert!(plan.instructions.len() < input.len());

        let after = input.apply(&plan.instructions);
        assert_eq!(after.get("b"), Decimal::ZERO);
        assert!(after.is_settled(config.tolerance));
    }

    #[test]
    fn test_dust_gap_is_not_charged_to_counterparty() {
        // the near-zero balances round to nothing, so nobody can pay them
        let input = balances(&[
            ("a", "1.02"),
            ("b", "-1.00"),
            ("c", "-0.004"),
            ("d", "-0.004"),
            ("e", "-0.004"),
            ("f", "-0.004"),
            ("g", "-0.004"),
        ]);
        let plan = plan_settlement_detailed(&input, &EngineConfig::default()).unwrap();

        assert_eq!(
            plan.instructions,
            vec![SettlementInstruction::new("b", "a", dec("1.00"))]
        );
        assert_eq!(plan.reinstated_participants, 0);
        assert_eq!(plan.absorbed_residual, Decimal::ZERO);
    }

    #[test]
    fn test_absorb_leftover_folds_drift_only() {
        let config = EngineConfig::default();
        let mut instructions = vec![
            SettlementInstruction::new("b", "a", dec("1.00")),
            SettlementInstruction::new("c", "a", dec("2.00")),
        ];

        let drift = Position::new("a", dec("0.013"));
        let absorbed = absorb_leftover(&mut instructions, &drift, &config, |i| &i.to_id);
        assert_eq!(absorbed, dec("0.01"));
        assert_eq!(instructions[0].amount, dec("1.00"));
        assert_eq!(instructions[1].amount, dec("2.01"));

        let balance = Position::new("a", dec("0.05"));
        let absorbed = absorb_leftover(&mut instructions, &balance, &config, |i| &i.to_id);
        assert_eq!(absorbed, Decimal::ZERO);
        assert_eq!(instructions[1].amount, dec("2.01"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            tolerance: dec("0.001"),
            decimal_places: 2,
            ..EngineConfig::default()
        };
        let input = balances(&[("a", "0.005"), ("b", "-0.005")]);
        let err = plan_settlement(&input, &config).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { ref field, .. } if field == "tolerance"));
    }

    #[test]
    fn test_choose_amount_prefers_nearest_without_drift() {
        assert_eq!(choose_amount(dec("33.333"), Decimal::ZERO, 2), dec("33.33"));
        assert_eq!(choose_amount(dec("30"), dec("0.004"), 2), dec("30"));
    }

    #[test]
    fn test_choose_amount_counteracts_drift() {
        assert_eq!(choose_amount(dec("0.504"), dec("0.004"), 2), dec("0.51"));
        assert_eq!(choose_amount(dec("0.506"), dec("-0.004"), 2), dec("0.50"));
    }

    #[test]
    fn test_largest_prefers_smaller_id_on_tie() {
        let positions = vec![
            Position::new("zed", dec("5")),
            Position::new("amy", dec("5")),
            Position::new("bob", dec("4")),
        ];
        assert_eq!(largest(&positions), Some(1));
        assert_eq!(largest(&[]), None);
    }
}
