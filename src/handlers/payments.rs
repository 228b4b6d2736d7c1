// src/handlers/payments.rs

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
    models::payment::{
        AnimalFunding, CreatePaymentPayload, DonorProgress, Payment, PaymentNotification,
        PaymentResponse,
    },
};

// POST /api/pembayaran
#[utoipa::path(
    post,
    path = "/api/pembayaran",
    tag = "Payments",
    request_body = CreatePaymentPayload,
    responses(
        (status = 201, description = "Charge created at the gateway", body = PaymentResponse),
        (status = 400, description = "Incomplete donor contact, no shares or nothing to charge"),
        (status = 403, description = "Caller may not pay for this donor"),
        (status = 502, description = "Gateway rejected or unreachable")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_payment(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreatePaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let payment = app_state.payment_service.create_payment(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    get,
    path = "/api/pembayaran",
    tag = "Payments",
    responses((status = 200, description = "All payments", body = Vec<PaymentResponse>)),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, AppError> {
    let payments = app_state.payment_service.list_payments().await?;
    Ok(Json(payments))
}

#[utoipa::path(
    get,
    path = "/api/pembayaran/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment", body = PaymentResponse),
        (status = 404, description = "Payment not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_payment(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let payment = app_state.payment_service.get_payment(id).await?;
    Ok(Json(payment))
}

#[utoipa::path(
    get,
    path = "/api/pembayaran/order/{order_id}",
    tag = "Payments",
    params(("order_id" = String, Path, description = "Order ID, e.g. ORDER-20250606-1a2b3c4d")),
    responses(
        (status = 200, description = "Payment", body = PaymentResponse),
        (status = 404, description = "Payment not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_by_order_id(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let payment = app_state.payment_service.get_by_order_id(&order_id).await?;
    Ok(Json(payment))
}

#[utoipa::path(
    get,
    path = "/api/pembayaran/rekap/hewan",
    tag = "Payments",
    responses((status = 200, description = "Funding status per animal", body = Vec<AnimalFunding>)),
    security(("api_jwt" = []))
)]
pub async fn funding_per_animal(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
) -> Result<impl IntoResponse, AppError> {
    let recap = app_state.payment_service.funding_per_animal().await?;
    Ok(Json(recap))
}

#[utoipa::path(
    get,
    path = "/api/pembayaran/rekap/pekurban",
    tag = "Payments",
    responses((status = 200, description = "Payment progress per donor", body = Vec<DonorProgress>)),
    security(("api_jwt" = []))
)]
pub async fn donor_progress(
    State(app_state): State<AppState>,
    _guard: RequireRole<Staff>,
) -> Result<impl IntoResponse, AppError> {
    let progress = app_state.payment_service.donor_progress().await?;
    Ok(Json(progress))
}

// Called by the gateway, authenticated by the signature in the body
#[utoipa::path(
    post,
    path = "/api/pembayaran/notifikasi",
    tag = "Payments",
    request_body = PaymentNotification,
    responses(
        (status = 200, description = "Notification processed", body = Payment),
        (status = 403, description = "Invalid signature"),
        (status = 404, description = "Unknown order")
    )
)]
pub async fn payment_notification(
    State(app_state): State<AppState>,
    Json(notification): Json<PaymentNotification>,
) -> Result<impl IntoResponse, AppError> {
    let payment = app_state.payment_service.handle_notification(notification).await?;
    Ok(Json(payment))
}
