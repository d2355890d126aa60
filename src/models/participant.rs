//! Participant display-name directory.
//!
//! The engine works on opaque ids only. Consumers resolve names through a
//! [`ParticipantDirectory`] just before presenting results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::ExpenseRecord;

/// Maps participant ids to display names.
///
/// # Example
///
/// ```
/// use settle_engine::models::ParticipantDirectory;
///
/// let directory = ParticipantDirectory::from_roster([("u_1", "Ana"), ("u_2", "Ben")]);
/// assert_eq!(directory.name("u_1").unwrap(), "Ana");
/// assert!(directory.name("u_3").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDirectory {
    names: HashMap<String, String>,
}

impl ParticipantDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from `(id, name)` pairs. Later pairs win.
    pub fn from_roster<I, K, V>(roster: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut directory = Self::new();
        for (id, name) in roster {
            directory.insert(id, name);
        }
        directory
    }

    /// Harvests names recorded on expenses (payers and split participants).
    ///
    /// Blank names are ignored and the first non-blank name seen for an id
    /// is kept.
    pub fn from_expenses(expenses: &[ExpenseRecord]) -> Self {
        let mut directory = Self::new();
        for expense in expenses {
            directory.insert_missing(&expense.payer_id, &expense.payer_name);
            for split in &expense.splits {
                directory.insert_missing(&split.participant_id, &split.participant_name);
            }
        }
        directory
    }

    /// Inserts or replaces a name.
    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    fn insert_missing(&mut self, id: &str, name: &str) {
        if name.trim().is_empty() || self.names.contains_key(id) {
            return;
        }
        self.names.insert(id.to_string(), name.to_string());
    }

    /// Fills in ids from `other` that this directory does not know yet.
    pub fn merge_missing(&mut self, other: &ParticipantDirectory) {
        for (id, name) in &other.names {
            self.names
                .entry(id.clone())
                .or_insert_with(|| name.clone());
        }
    }

    /// Resolves a display name.
    pub fn name(&self, id: &str) -> EngineResult<&str> {
        self.names
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| EngineError::UnknownParticipant {
                participant_id: id.to_string(),
            })
    }

    /// Returns the number of known participants.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no participant is known.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
