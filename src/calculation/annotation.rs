//! Display-name annotation of engine output.
//!
//! The core only handles opaque ids; these helpers attach names right
//! before results are shown to a user.

use crate::error::EngineResult;
use crate::models::{
    AnnotatedDistribution, AnnotatedInstruction, DistributionSummary, ParticipantDirectory,
    ParticipantRef, SettlementInstruction, UserDistributionEntry,
};

fn participant_ref(id: &str, directory: &ParticipantDirectory) -> EngineResult<ParticipantRef> {
    Ok(ParticipantRef {
        id: id.to_string(),
        name: directory.name(id)?.to_string(),
    })
}

/// Attaches payer and payee names to every instruction.
///
/// # Errors
///
/// Returns [`EngineError::UnknownParticipant`](crate::error::EngineError::UnknownParticipant)
/// for the first id the directory cannot resolve.
pub fn annotate_plan(
    instructions: &[SettlementInstruction],
    directory: &ParticipantDirectory,
) -> EngineResult<Vec<AnnotatedInstruction>> {
    instructions
        .iter()
        .map(|instruction| {
            Ok(AnnotatedInstruction {
                from: participant_ref(&instruction.from_id, directory)?,
                to: participant_ref(&instruction.to_id, directory)?,
                amount: instruction.amount,
            })
        })
        .collect()
}

/// Attaches payer names to the by-user buckets of a distribution summary.
pub fn annotate_distribution(
    summary: DistributionSummary,
    directory: &ParticipantDirectory,
) -> EngineResult<AnnotatedDistribution> {
    let by_user = summary
        .by_user
        .into_iter()
        .map(|entry| {
            Ok(UserDistributionEntry {
                name: directory.name(&entry.key)?.to_string(),
                user_id: entry.key,
                amount: entry.amount,
                percentage: entry.percentage,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    Ok(AnnotatedDistribution {
        by_user,
        by_category: summary.by_category,
        total_amount: summary.total_amount,
    })
}
