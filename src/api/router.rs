use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, schedule_entry};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Listing
        .route("/api/v1/locations/{location_id}/schedule-entries", get(schedule_entry::list_entries))

        // Entries
        .route("/api/v1/schedule-entries", post(schedule_entry::create_entry))
        .route("/api/v1/schedule-entries/{id}", get(schedule_entry::get_entry))
        .route("/api/v1/schedule-entries/{id}/reschedule", post(schedule_entry::reschedule_entry))
        .route("/api/v1/schedule-entries/{id}/archive", post(schedule_entry::archive_entry))
        .route("/api/v1/schedule-entries/{id}/unarchive", post(schedule_entry::unarchive_entry))
        .route("/api/v1/schedule-entries/{id}/skip", post(schedule_entry::skip_occurrence))

        // Resources
        .route("/api/v1/schedule-entries/{id}/rooms", put(schedule_entry::update_rooms))
        .route("/api/v1/schedule-entries/{id}/attendees", put(schedule_entry::update_attendees))
        .route("/api/v1/schedule-entries/{id}/service", put(schedule_entry::update_service))
        .route("/api/v1/schedule-entries/{id}/capacity", put(schedule_entry::update_capacity))

        // Exceptions
        .route("/api/v1/schedule-entries/{id}/exception", post(schedule_entry::edit_exception))
        .route("/api/v1/schedule-entries/{id}/restore", post(schedule_entry::restore_exception))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
