// src/handlers/donors.rs

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
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, RequireRole, Staff},
    },
    models::donor::{CreateDonorPayload, Donor, UpdateDonorPayload},
};

#[utoipa::path(
    post,
    path = "/api/pekurban",
    tag = "Donors",
    request_body = CreateDonorPayload,
    responses(
        (status = 201, description = "Donor registered", body = Donor),
        (status = 409, description = "User already registered as a donor")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_donor(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreateDonorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let donor = app_state.donor_service.create_donor(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(donor)))
}

#[utoipa::path(
    get,
    path = "/api/pekurban",
    tag = "Donors",
    responses((status = 200, description = "All donors", body = Vec<Donor>)),
    security(("api_jwt" = []))
)]
pub async fn list_donors(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
) -> Result<impl IntoResponse, AppError> {
    let donors = app_state.donor_service.list_donors().await?;
    Ok(Json(donors))
}

#[utoipa::path(
    get,
    path = "/api/pekurban/me",
    tag = "Donors",
    responses(
        (status = 200, description = "Donor record linked to the caller", body = Donor),
        (status = 404, description = "Caller is not registered as a donor")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_donor(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let donor = app_state.donor_service.get_my_donor(&actor).await?;
    Ok(Json(donor))
}

#[utoipa::path(
    get,
    path = "/api/pekurban/{id}",
    tag = "Donors",
    params(("id" = Uuid, Path, description = "Donor ID")),
    responses(
        (status = 200, description = "Donor", body = Donor),
        (status = 404, description = "Donor not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_donor(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let donor = app_state.donor_service.get_donor(&actor, id).await?;
    Ok(Json(donor))
}

#[utoipa::path(
    put,
    path = "/api/pekurban/{id}",
    tag = "Donors",
    request_body = UpdateDonorPayload,
    params(("id" = Uuid, Path, description = "Donor ID")),
    responses(
        (status = 200, description = "Donor updated", body = Donor),
        (status = 403, description = "Not allowed to edit this donor")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_donor(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDonorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let donor = app_state.donor_service.update_donor(&actor, id, payload).await?;
    Ok(Json(donor))
}

#[utoipa::path(
    delete,
    path = "/api/pekurban/{id}",
    tag = "Donors",
    params(("id" = Uuid, Path, description = "Donor ID")),
    responses(
        (status = 204, description = "Donor deleted"),
        (status = 409, description = "Donor still has shares or payments")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_donor(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.donor_service.delete_donor(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
