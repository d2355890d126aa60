//! Response types for the settlement engine API.
//!
//! This module defines the success bodies for each endpoint, the error
//! body, and the mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{AnnotatedDistribution, AnnotatedInstruction, AuditTrace, Balances};

/// Response body for `POST /settlement`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResponse {
    /// The group identifier from the request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// Engine version that produced the plan.
    pub engine_version: String,
    /// Net balance per participant.
    pub balances: Balances,
    /// Payments with display names attached.
    pub instructions: Vec<AnnotatedInstruction>,
    /// Audit trace of the settlement stages.
    pub audit_trace: AuditTrace,
}

/// Response body for `POST /balances`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancesResponse {
    /// The group identifier from the request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Net balance per participant.
    pub balances: Balances,
    /// Number of participants whose balance lies outside tolerance.
    pub unsettled_count: usize,
}

/// Response body for `POST /analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// The group identifier from the request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Spending by payer and by category.
    pub distribution: AnnotatedDistribution,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
///
/// Every error leaving a handler goes through [`IntoResponse`] here, so
/// all of them carry the same JSON content type.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::DataIntegrity { expense_id, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "DATA_INTEGRITY",
                    message,
                    format!("Splits of expense '{}' must add up to its amount", expense_id),
                ),
            ),
            EngineError::InvalidExpense { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INVALID_EXPENSE", message),
            ),
            EngineError::InvalidSplit { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INVALID_SPLIT", message),
            ),
            EngineError::UnbalancedLedger { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "UNBALANCED_LEDGER",
                    message,
                    "Balances must describe a closed group before they can be settled",
                ),
            ),
            EngineError::UnknownParticipant { participant_id } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "UNKNOWN_PARTICIPANT",
                    message,
                    format!(
                        "Add '{}' to members or record a name on one of its expenses",
                        participant_id
                    ),
                ),
            ),
        };
        ApiErrorResponse { status, error }
    }
}
