//! Request types for the settlement engine API.
//!
//! All three endpoints accept the same body: the group's expense records
//! and, optionally, a member roster used to resolve display names.

use serde::{Deserialize, Serialize};

use crate::models::{ExpenseRecord, ParticipantDirectory};

/// Request body for `/settlement`, `/balances` and `/analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRequest {
    /// Caller-supplied group identifier, echoed back in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Known group members. Names here take precedence over names
    /// recorded on the expenses.
    #[serde(default)]
    pub members: Vec<MemberRequest>,
    /// A consistent snapshot of the group's expenses.
    pub expenses: Vec<ExpenseRecord>,
}

/// A group member in a request roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRequest {
    /// Opaque participant id.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl SettlementRequest {
    /// Builds the name directory for this request.
    ///
    /// Roster entries come first; names harvested from the expenses fill
    /// in any id the roster does not mention.
    pub fn directory(&self) -> ParticipantDirectory {
        let mut directory = ParticipantDirectory::from_roster(
            self.members
                .iter()
                .map(|m| (m.id.as_str(), m.name.as_str())),
        );
        directory.merge_missing(&ParticipantDirectory::from_expenses(&self.expenses));
        directory
    }
}
