use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use crate::api::dtos::responses::HealthResponse;
use crate::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database: state.config.backend_name(),
    })
}
