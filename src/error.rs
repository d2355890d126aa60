//! Error types for the settlement engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every error condition the engine can report. All failures are
//! deterministic functions of the input; nothing here is retryable.

use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the settlement engine.
///
/// # Example
///
/// ```
/// use settle_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value was out of range.
    #[error("Invalid configuration field '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The splits of an expense do not add up to its amount.
    ///
    /// This points at a bug in whatever created the expense; the engine
    /// does not try to repair it.
    #[error(
        "Data integrity violation in expense '{expense_id}': splits sum to {split_total} but amount is {amount}"
    )]
    DataIntegrity {
        /// The ID of the offending expense.
        expense_id: String,
        /// The sum of all split amounts.
        split_total: Decimal,
        /// The recorded expense amount.
        amount: Decimal,
    },

    /// An expense carried a value the engine cannot work with.
    #[error("Invalid expense '{expense_id}': {message}")]
    InvalidExpense {
        /// The ID of the offending expense.
        expense_id: String,
        /// A description of what made the expense invalid.
        message: String,
    },

    /// Split generation was asked for something it cannot produce.
    #[error("Invalid split: {message}")]
    InvalidSplit {
        /// A description of the problem.
        message: String,
    },

    /// A balance vector does not sum to zero, so it cannot be settled.
    #[error("Balances do not sum to zero (residual {residual})")]
    UnbalancedLedger {
        /// The sum of all balances.
        residual: Decimal,
    },

    /// A participant id has no display name in the directory.
    #[error("Unknown participant: {participant_id}")]
    UnknownParticipant {
        /// The id that could not be resolved.
        participant_id: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_invalid_config_displays_field_and_message() {
        let error = EngineError::InvalidConfig {
            field: "tolerance".to_string(),
            message: "must be greater than zero".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration field 'tolerance': must be greater than zero"
        );
    }

    #[test]
    fn test_data_integrity_names_expense() {
        let error = EngineError::DataIntegrity {
            expense_id: "exp_042".to_string(),
            split_total: Decimal::from_str("89.50").unwrap(),
            amount: Decimal::from_str("90.00").unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Data integrity violation in expense 'exp_042': splits sum to 89.50 but amount is 90.00"
        );
    }

    #[test]
    fn test_unbalanced_ledger_displays_residual() {
        let error = EngineError::UnbalancedLedger {
            residual: Decimal::from_str("12.5").unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Balances do not sum to zero (residual 12.5)"
        );
    }

    #[test]
    fn test_unknown_participant_displays_id() {
        let error = EngineError::UnknownParticipant {
            participant_id: "u_9".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown participant: u_9");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_invalid_expense() -> EngineResult<()> {
            Err(EngineError::InvalidExpense {
                expense_id: "exp_1".to_string(),
                message: "negative amount".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_invalid_expense()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
