// src/handlers/slaughter.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole, Staff},
    models::slaughter::{CreateSlaughterPayload, SlaughterRecord, UpdateSlaughterPayload},
};

#[utoipa::path(
    post,
    path = "/api/penyembelihan",
    tag = "Slaughter",
    request_body = CreateSlaughterPayload,
    responses(
        (status = 201, description = "Slaughter scheduled", body = SlaughterRecord),
        (status = 404, description = "Animal not found"),
        (status = 409, description = "Animal already has a slaughter record"),
        (status = 422, description = "Animal is not fully paid")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_record(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
    Json(payload): Json<CreateSlaughterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let record = app_state.slaughter_service.create_record(payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/penyembelihan",
    tag = "Slaughter",
    responses((status = 200, description = "All slaughter records", body = Vec<SlaughterRecord>)),
    security(("api_jwt" = []))
)]
pub async fn list_records(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let records = app_state.slaughter_service.list_records().await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/penyembelihan/{id}",
    tag = "Slaughter",
    params(("id" = Uuid, Path, description = "Slaughter record ID")),
    responses(
        (status = 200, description = "Slaughter record", body = SlaughterRecord),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_record(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.slaughter_service.get_record(id).await?;
    Ok(Json(record))
}

#[utoipa::path(
    put,
    path = "/api/penyembelihan/{id}",
    tag = "Slaughter",
    request_body = UpdateSlaughterPayload,
    params(("id" = Uuid, Path, description = "Slaughter record ID")),
    responses((status = 200, description = "Slaughter record updated", body = SlaughterRecord)),
    security(("api_jwt" = []))
)]
pub async fn update_record(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSlaughterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let record = app_state.slaughter_service.update_record(id, payload).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/penyembelihan/{id}",
    tag = "Slaughter",
    params(("id" = Uuid, Path, description = "Slaughter record ID")),
    responses((status = 204, description = "Slaughter record deleted")),
    security(("api_jwt" = []))
)]
pub async fn delete_record(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.slaughter_service.delete_record(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
