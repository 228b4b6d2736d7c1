// src/gateway.rs
//
// Boundary to the external payment gateway. The payment service only sees the
// `PaymentGateway` trait; `MidtransClient` is the production implementation.

pub mod midtrans;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::payment::{Bank, PaymentMethod, PaymentStatus};

pub use midtrans::MidtransClient;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("charge rejected: {0}")]
    Rejected(String),

    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Client-generated order id, also sent as the idempotency key.
    pub order_id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub bank: Option<Bank>,
    pub customer: CustomerDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualAccount {
    pub bank: String,
    pub va_number: String,
}

#[derive(Debug, Clone)]
pub struct ChargeResponse {
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub payment_type: Option<String>,
    pub va_numbers: Vec<VirtualAccount>,
    pub qr_redirect_url: Option<String>,
    pub fraud_status: Option<String>,
    pub approval_code: Option<String>,
    pub transaction_time: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submits a single charge. At-most-once per call, no retries.
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, GatewayError>;

    /// Checks the signature carried by an asynchronous status notification.
    fn verify_notification(
        &self,
        order_id: &str,
        status_code: &str,
        gross_amount: &str,
        signature_key: &str,
    ) -> bool;
}
