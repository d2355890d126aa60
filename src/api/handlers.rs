//! HTTP request handlers for the settlement engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    analyze_distribution, annotate_distribution, annotate_plan, net_balances, settle_group,
};
use crate::error::EngineError;

use super::request::SettlementRequest;
use super::response::{
    AnalysisResponse, ApiError, ApiErrorResponse, BalancesResponse, SettlementResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/settlement", post(settlement_handler))
        .route("/balances", post(balances_handler))
        .route("/analysis", post(analysis_handler))
        .with_state(state)
}

/// Handler for POST /settlement.
///
/// Returns the balances, the annotated payment plan and the audit trace.
async fn settlement_handler(
    State(state): State<AppState>,
    payload: Result<Json<SettlementRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing settlement request");

    let request = match parse_request(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = settle_group(&request.expenses, state.config()).and_then(|report| {
        let instructions = annotate_plan(&report.instructions, &request.directory())?;
        Ok(SettlementResponse {
            group_id: request.group_id.clone(),
            calculation_id: report.calculation_id,
            timestamp: report.timestamp,
            engine_version: report.engine_version,
            balances: report.balances,
            instructions,
            audit_trace: report.audit_trace,
        })
    });

    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                expenses = request.expenses.len(),
                instructions = body.instructions.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Settlement completed successfully"
            );
            json_response(StatusCode::OK, body)
        }
        Err(err) => engine_failure(correlation_id, err),
    }
}

/// Handler for POST /balances.
async fn balances_handler(
    State(state): State<AppState>,
    payload: Result<Json<SettlementRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing balances request");

    let request = match parse_request(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    match net_balances(&request.expenses, state.config()) {
        Ok(balances) => {
            let unsettled_count = balances.count_unsettled(state.config().tolerance);
            info!(
                correlation_id = %correlation_id,
                participants = balances.len(),
                unsettled_count,
                duration_us = start_time.elapsed().as_micros(),
                "Balances completed successfully"
            );
            json_response(
                StatusCode::OK,
                BalancesResponse {
                    group_id: request.group_id,
                    balances,
                    unsettled_count,
                },
            )
        }
        Err(err) => engine_failure(correlation_id, err),
    }
}

/// Handler for POST /analysis.
async fn analysis_handler(
    State(state): State<AppState>,
    payload: Result<Json<SettlementRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing analysis request");

    let request = match parse_request(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let summary = analyze_distribution(&request.expenses, state.config());
    match annotate_distribution(summary, &request.directory()) {
        Ok(distribution) => {
            info!(
                correlation_id = %correlation_id,
                total_amount = %distribution.total_amount,
                categories = distribution.by_category.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Analysis completed successfully"
            );
            json_response(
                StatusCode::OK,
                AnalysisResponse {
                    group_id: request.group_id,
                    distribution,
                },
            )
        }
        Err(err) => engine_failure(correlation_id, err),
    }
}

/// Unwraps the JSON body or builds the 400 response for it.
fn parse_request(
    correlation_id: Uuid,
    payload: Result<Json<SettlementRequest>, JsonRejection>,
) -> Result<SettlementRequest, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
    .into_response())
}

fn engine_failure(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Calculation failed"
    );
    ApiErrorResponse::from(err).into_response()
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use axum::{body::Body, http::Request};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tower::ServiceExt;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_state() -> AppState {
        AppState::new(EngineConfig::default())
    }

    fn dinner_body() -> String {
        serde_json::json!({
            "group_id": "trip",
            "members": [
                {"id": "x", "name": "Xia"},
                {"id": "y", "name": "Yusuf"},
                {"id": "z", "name": "Zoe"}
            ],
            "expenses": [{
                "id": "e1",
                "payer_id": "x",
                "amount": "90",
                "splits": [
                    {"participant_id": "x", "amount": "30"},
                    {"participant_id": "y", "amount": "30"},
                    {"participant_id": "z", "amount": "30"}
                ],
                "category": "Food",
                "timestamp": "2026-03-01T19:30:00Z"
            }]
        })
        .to_string()
    }

    async fn post(uri: &str, body: impl Into<Body>) -> Response {
        create_router(create_test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_settlement_returns_annotated_plan() {
        let response = post("/settlement", dinner_body()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let result: SettlementResponse = read_json(response).await;
        assert_eq!(result.group_id.as_deref(), Some("trip"));
        assert_eq!(result.instructions.len(), 2);
        assert_eq!(result.instructions[0].from.name, "Yusuf");
        assert_eq!(result.instructions[0].to.name, "Xia");
        assert_eq!(result.instructions[0].amount, dec("30"));
        assert_eq!(result.balances.get("x"), dec("60"));
        assert_eq!(result.audit_trace.steps.len(), 3);
    }

    #[tokio::test]
    async fn test_balances_endpoint() {
        let response = post("/balances", dinner_body()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let result: BalancesResponse = read_json(response).await;
        assert_eq!(result.balances.get("y"), dec("-30"));
        assert_eq!(result.balances.get("z"), dec("-30"));
        assert_eq!(result.unsettled_count, 3);
    }

    #[tokio::test]
    async fn test_analysis_endpoint_attaches_names() {
        let response = post("/analysis", dinner_body()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let result: AnalysisResponse = read_json(response).await;
        assert_eq!(result.distribution.total_amount, dec("90"));
        assert_eq!(result.distribution.by_user.len(), 1);
        assert_eq!(result.distribution.by_user[0].name, "Xia");
        assert_eq!(result.distribution.by_user[0].percentage, dec("100"));
        assert_eq!(result.distribution.by_category[0].key, "Food");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let response = post("/settlement", "{invalid json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: ApiError = read_json(response).await;
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_expenses_returns_validation_error() {
        let response = post("/balances", r#"{"group_id": "trip"}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: ApiError = read_json(response).await;
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.message.contains("missing field"));
    }

    #[tokio::test]
    async fn test_integrity_violation_returns_422() {
        let body = dinner_body().replace("\"amount\":\"90\"", "\"amount\":\"95\"");
        let response = post("/settlement", body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let error: ApiError = read_json(response).await;
        assert_eq!(error.code, "DATA_INTEGRITY");
    }

    #[tokio::test]
    async fn test_unnamed_participant_returns_422() {
        let body = dinner_body().replace(r#"{"id":"z","name":"Zoe"}"#, "");
        let body = body.replace(",]", "]");
        let response = post("/settlement", body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let error: ApiError = read_json(response).await;
        assert_eq!(error.code, "UNKNOWN_PARTICIPANT");
    }
}
