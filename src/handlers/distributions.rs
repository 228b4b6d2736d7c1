// src/handlers/distributions.rs

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
    models::{
        distribution::{CreateDistributionPayload, DistributionDetail, PackageTotal},
        recipient::Recipient,
    },
};

#[utoipa::path(
    post,
    path = "/api/distribusi",
    tag = "Distributions",
    request_body = CreateDistributionPayload,
    responses(
        (status = 201, description = "Distribution recorded", body = DistributionDetail),
        (status = 404, description = "Recipient or animal not found"),
        (status = 409, description = "Animal has not been slaughtered")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_distribution(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
    Json(payload): Json<CreateDistributionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let distribution = app_state.distribution_service.create_distribution(payload).await?;
    Ok((StatusCode::CREATED, Json(distribution)))
}

#[utoipa::path(
    get,
    path = "/api/distribusi",
    tag = "Distributions",
    responses((status = 200, description = "All distributions", body = Vec<DistributionDetail>)),
    security(("api_jwt" = []))
)]
pub async fn list_distributions(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
) -> Result<impl IntoResponse, AppError> {
    let distributions = app_state.distribution_service.list_distributions().await?;
    Ok(Json(distributions))
}

#[utoipa::path(
    get,
    path = "/api/distribusi/{id}",
    tag = "Distributions",
    params(("id" = Uuid, Path, description = "Distribution ID")),
    responses(
        (status = 200, description = "Distribution", body = DistributionDetail),
        (status = 404, description = "Distribution not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_distribution(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let distribution = app_state.distribution_service.get_distribution(id).await?;
    Ok(Json(distribution))
}

#[utoipa::path(
    get,
    path = "/api/distribusi/total-paket",
    tag = "Distributions",
    responses((status = 200, description = "Packages handed out so far", body = PackageTotal)),
    security(("api_jwt" = []))
)]
pub async fn total_packages(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
) -> Result<impl IntoResponse, AppError> {
    let total = app_state.distribution_service.total_packages().await?;
    Ok(Json(total))
}

#[utoipa::path(
    get,
    path = "/api/distribusi/belum-terdistribusi",
    tag = "Distributions",
    responses((status = 200, description = "Recipients without any distribution", body = Vec<Recipient>)),
    security(("api_jwt" = []))
)]
pub async fn unserved_recipients(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
) -> Result<impl IntoResponse, AppError> {
    let recipients = app_state.distribution_service.unserved_recipients().await?;
    Ok(Json(recipients))
}

#[utoipa::path(
    delete,
    path = "/api/distribusi/{id}",
    tag = "Distributions",
    params(("id" = Uuid, Path, description = "Distribution ID")),
    responses((status = 204, description = "Distribution deleted")),
    security(("api_jwt" = []))
)]
pub async fn delete_distribution(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.distribution_service.delete_distribution(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
