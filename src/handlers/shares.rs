// src/handlers/shares.rs

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
        rbac::{AdminOnly, RequireRole},
    },
    models::share::{CreateSharePayload, ShareResponse, UpdateSharePayload},
};

// POST /api/patungan
#[utoipa::path(
    post,
    path = "/api/patungan",
    tag = "Shares",
    request_body = CreateSharePayload,
    responses(
        (status = 201, description = "Share registered", body = ShareResponse),
        (status = 400, description = "Headcount does not fit the animal"),
        (status = 403, description = "Caller may not act for this donor"),
        (status = 404, description = "Donor or animal not found"),
        (status = 409, description = "Capacity exceeded or animal already privately owned")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_share(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreateSharePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let share = app_state.share_service.create_share(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(share)))
}

#[utoipa::path(
    get,
    path = "/api/patungan",
    tag = "Shares",
    responses((status = 200, description = "Shares visible to the caller", body = Vec<ShareResponse>)),
    security(("api_jwt" = []))
)]
pub async fn list_shares(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let shares = app_state.share_service.list_shares(&actor).await?;
    Ok(Json(shares))
}

#[utoipa::path(
    get,
    path = "/api/patungan/hewan/{id}",
    tag = "Shares",
    params(("id" = Uuid, Path, description = "Animal ID")),
    responses(
        (status = 200, description = "Shares of the animal", body = Vec<ShareResponse>),
        (status = 404, description = "Animal not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_by_animal(
    State(app_state): State<AppState>,
    Path(animal_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let shares = app_state.share_service.list_by_animal(animal_id).await?;
    Ok(Json(shares))
}

#[utoipa::path(
    get,
    path = "/api/patungan/pekurban/{id}",
    tag = "Shares",
    params(("id" = Uuid, Path, description = "Donor ID")),
    responses(
        (status = 200, description = "Shares of the donor", body = Vec<ShareResponse>),
        (status = 404, description = "Donor not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_by_donor(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(donor_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let shares = app_state.share_service.list_by_donor(&actor, donor_id).await?;
    Ok(Json(shares))
}

#[utoipa::path(
    put,
    path = "/api/patungan/{donor_id}/{animal_id}",
    tag = "Shares",
    request_body = UpdateSharePayload,
    params(
        ("donor_id" = Uuid, Path, description = "Donor ID"),
        ("animal_id" = Uuid, Path, description = "Animal ID")
    ),
    responses(
        (status = 200, description = "Share updated", body = ShareResponse),
        (status = 404, description = "Share not found"),
        (status = 409, description = "Capacity exceeded")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_share(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path((donor_id, animal_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateSharePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let share = app_state.share_service
        .update_share(&actor, donor_id, animal_id, payload)
        .await?;
    Ok(Json(share))
}

#[utoipa::path(
    delete,
    path = "/api/patungan/{donor_id}/{animal_id}",
    tag = "Shares",
    params(
        ("donor_id" = Uuid, Path, description = "Donor ID"),
        ("animal_id" = Uuid, Path, description = "Animal ID")
    ),
    responses(
        (status = 204, description = "Share removed"),
        (status = 404, description = "Share not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_share(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path((donor_id, animal_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.share_service.delete_share(donor_id, animal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
