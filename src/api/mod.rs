use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::{
    models::{ItineraryRequest, ItineraryResponse, PlanRequest, PlanResult},
    planner::TripPlanner,
};

mod error;

pub use error::ApiError;

/// Body of every failed `/ai` call that is not the caller's fault
pub const AI_ERROR: &str = "AI error";
/// Body of every failed `/plan` call that is not the caller's fault
pub const SERVER_ERROR: &str = "Server error";

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TripPlanner>,
}

impl AppState {
    pub fn new(planner: TripPlanner) -> Self {
        Self {
            planner: Arc::new(planner),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/ai", post(generate_itinerary))
        .route("/plan", post(plan_trip))
        .with_state(state)
}

async fn ping() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn generate_itinerary(
    State(state): State<AppState>,
    payload: Result<Json<ItineraryRequest>, JsonRejection>,
) -> Result<Json<ItineraryResponse>, ApiError> {
    let Json(req) = payload?;
    let itinerary = state
        .planner
        .generate_itinerary(&req)
        .await
        .map_err(|e| ApiError::from_error(e, AI_ERROR))?;
    Ok(Json(ItineraryResponse { itinerary }))
}

async fn plan_trip(
    State(state): State<AppState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResult>, ApiError> {
    let Json(req) = payload?;
    let result = state
        .planner
        .plan_trip(&req)
        .await
        .map_err(|e| ApiError::from_error(e, SERVER_ERROR))?;
    Ok(Json(result))
}
