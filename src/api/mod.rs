//! HTTP API module for the settlement engine.
//!
//! This module exposes the settlement, balance and analysis calculations
//! as stateless JSON endpoints. Each request carries its own snapshot of
//! expense records.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{MemberRequest, SettlementRequest};
pub use response::{AnalysisResponse, ApiError, BalancesResponse, SettlementResponse};
pub use state::AppState;
