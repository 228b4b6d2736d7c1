// src/handlers/animals.rs

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
    middleware::rbac::{AdminOnly, RequireRole},
    models::animal::{AnimalResponse, CreateAnimalPayload, UpdateAnimalPayload},
};

// POST /api/hewan-kurban
#[utoipa::path(
    post,
    path = "/api/hewan-kurban",
    tag = "Animals",
    request_body = CreateAnimalPayload,
    responses(
        (status = 201, description = "Animal registered", body = AnimalResponse),
        (status = 400, description = "Invalid weight or price")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_animal(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateAnimalPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let animal = app_state.animal_service.create_animal(payload).await?;
    Ok((StatusCode::CREATED, Json(animal)))
}

#[utoipa::path(
    get,
    path = "/api/hewan-kurban",
    tag = "Animals",
    responses((status = 200, description = "All animals", body = Vec<AnimalResponse>)),
    security(("api_jwt" = []))
)]
pub async fn list_animals(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let animals = app_state.animal_service.list_animals().await?;
    Ok(Json(animals))
}

#[utoipa::path(
    get,
    path = "/api/hewan-kurban/{id}",
    tag = "Animals",
    params(("id" = Uuid, Path, description = "Animal ID")),
    responses(
        (status = 200, description = "Animal", body = AnimalResponse),
        (status = 404, description = "Animal not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_animal(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let animal = app_state.animal_service.get_animal(id).await?;
    Ok(Json(animal))
}

#[utoipa::path(
    put,
    path = "/api/hewan-kurban/{id}",
    tag = "Animals",
    request_body = UpdateAnimalPayload,
    params(("id" = Uuid, Path, description = "Animal ID")),
    responses(
        (status = 200, description = "Animal updated", body = AnimalResponse),
        (status = 409, description = "Kind or privacy change while shares exist")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_animal(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAnimalPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let animal = app_state.animal_service.update_animal(id, payload).await?;
    Ok(Json(animal))
}

#[utoipa::path(
    delete,
    path = "/api/hewan-kurban/{id}",
    tag = "Animals",
    params(("id" = Uuid, Path, description = "Animal ID")),
    responses(
        (status = 204, description = "Animal deleted"),
        (status = 409, description = "Animal still referenced")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_animal(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.animal_service.delete_animal(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
