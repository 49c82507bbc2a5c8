use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::ListEntriesQuery;
use crate::api::extractors::{json::AppJson, query::AppQuery};
use crate::domain::models::operations::{
    CreateEntryCommand, ExceptionEditCommand, RescheduleCommand, RestoreExceptionCommand, ScopeCommand,
    UpdateAttendeesCommand, UpdateCapacityCommand, UpdateRoomsCommand, UpdateServiceCommand,
};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CreateEntryCommand>,
) -> Result<impl IntoResponse, AppError> {
    info!(
        "create_entry: {} booking for tutor {} at {}",
        payload.recurrence_type.as_str(),
        payload.tutor_id,
        payload.start_at.to_rfc3339()
    );
    let created = state.schedule_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<String>,
    AppQuery(query): AppQuery<ListEntriesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.schedule_service.list_by_location(&location_id, &query.into()).await?;
    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.get_by_id(&id).await?))
}

pub async fn reschedule_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<RescheduleCommand>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.reschedule(&id, payload).await?))
}

pub async fn archive_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ScopeCommand>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.archive(&id, payload).await?))
}

pub async fn unarchive_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ScopeCommand>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.unarchive(&id, payload).await?))
}

pub async fn skip_occurrence(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.skip_occurrence(&id).await?))
}

pub async fn update_rooms(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateRoomsCommand>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.update_rooms(&id, payload).await?))
}

pub async fn update_attendees(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateAttendeesCommand>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.update_attendees(&id, payload).await?))
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateServiceCommand>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.update_service_offered(&id, payload).await?))
}

pub async fn update_capacity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateCapacityCommand>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.update_capacity(&id, payload).await?))
}

pub async fn edit_exception(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ExceptionEditCommand>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.schedule_service.exception_edit(&id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn restore_exception(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<RestoreExceptionCommand>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.restore_exception(&id, payload).await?))
}
