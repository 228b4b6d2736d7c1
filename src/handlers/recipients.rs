// src/handlers/recipients.rs

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
    models::recipient::{CreateRecipientPayload, Recipient, UpdateRecipientPayload},
};

#[utoipa::path(
    post,
    path = "/api/penerima",
    tag = "Recipients",
    request_body = CreateRecipientPayload,
    responses(
        (status = 201, description = "Recipient registered", body = Recipient),
        (status = 400, description = "Name missing and no donor to copy it from"),
        (status = 404, description = "Linked donor not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_recipient(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
    Json(payload): Json<CreateRecipientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let recipient = app_state.recipient_service.create_recipient(payload).await?;
    Ok((StatusCode::CREATED, Json(recipient)))
}

#[utoipa::path(
    get,
    path = "/api/penerima",
    tag = "Recipients",
    responses((status = 200, description = "All recipients", body = Vec<Recipient>)),
    security(("api_jwt" = []))
)]
pub async fn list_recipients(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
) -> Result<impl IntoResponse, AppError> {
    let recipients = app_state.recipient_service.list_recipients().await?;
    Ok(Json(recipients))
}

#[utoipa::path(
    get,
    path = "/api/penerima/{id}",
    tag = "Recipients",
    params(("id" = Uuid, Path, description = "Recipient ID")),
    responses(
        (status = 200, description = "Recipient", body = Recipient),
        (status = 404, description = "Recipient not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_recipient(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let recipient = app_state.recipient_service.get_recipient(id).await?;
    Ok(Json(recipient))
}

#[utoipa::path(
    put,
    path = "/api/penerima/{id}",
    tag = "Recipients",
    request_body = UpdateRecipientPayload,
    params(("id" = Uuid, Path, description = "Recipient ID")),
    responses((status = 200, description = "Recipient updated", body = Recipient)),
    security(("api_jwt" = []))
)]
pub async fn update_recipient(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRecipientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let recipient = app_state.recipient_service.update_recipient(id, payload).await?;
    Ok(Json(recipient))
}

#[utoipa::path(
    delete,
    path = "/api/penerima/{id}",
    tag = "Recipients",
    params(("id" = Uuid, Path, description = "Recipient ID")),
    responses(
        (status = 204, description = "Recipient deleted"),
        (status = 409, description = "Recipient has distributions")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_recipient(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.recipient_service.delete_recipient(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
