// src/models/payment.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::animal::AnimalKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Qris,
    Gopay,
    Shopeepay,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Qris => "qris",
            PaymentMethod::Gopay => "gopay",
            PaymentMethod::Shopeepay => "shopeepay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Bank {
    Bca,
    Bni,
    Bri,
    Cimb,
    Permata,
}

impl Bank {
    pub fn as_str(self) -> &'static str {
        match self {
            Bank::Bca => "bca",
            Bank::Bni => "bni",
            Bank::Bri => "bri",
            Bank::Cimb => "cimb",
            Bank::Permata => "permata",
        }
    }
}

/// Gateway transaction status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Capture,
    Settlement,
    Deny,
    Cancel,
    Expire,
    Failure,
    Refund,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Capture => "capture",
            PaymentStatus::Settlement => "settlement",
            PaymentStatus::Deny => "deny",
            PaymentStatus::Cancel => "cancel",
            PaymentStatus::Expire => "expire",
            PaymentStatus::Failure => "failure",
            PaymentStatus::Refund => "refund",
        }
    }

    /// Money has been received.
    pub fn is_settled(self) -> bool {
        matches!(self, PaymentStatus::Settlement | PaymentStatus::Capture)
    }

    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        match self {
            Pending => next != Pending,
            Capture => matches!(next, Settlement | Refund | Cancel | Deny),
            Settlement => next == Refund,
            Deny | Cancel | Expire | Failure | Refund => false,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPaymentStatus(pub String);

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "pending" => PaymentStatus::Pending,
            "capture" => PaymentStatus::Capture,
            "settlement" => PaymentStatus::Settlement,
            "deny" => PaymentStatus::Deny,
            "cancel" => PaymentStatus::Cancel,
            "expire" => PaymentStatus::Expire,
            "failure" => PaymentStatus::Failure,
            "refund" => PaymentStatus::Refund,
            _ => return Err(UnknownPaymentStatus(s.to_string())),
        })
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub order_id: String,
    pub transaction_id: String,
    pub donor_id: Uuid,
    pub method: String,
    pub bank: Option<String>,
    pub payment_type: Option<String>,
    pub va_number: Option<String>,
    #[schema(example = "3000000.00")]
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub fraud_status: Option<String>,
    pub approval_code: Option<String>,
    pub transaction_time: Option<DateTime<Utc>>,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a gateway notification does to a stored payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEffect {
    Transition,
    /// Same status, new transaction or fraud metadata.
    Refresh,
    Unchanged,
    Disallowed,
}

impl Payment {
    pub fn notification_effect(
        &self,
        next: PaymentStatus,
        transaction_id: Option<&str>,
        fraud_status: Option<&str>,
    ) -> NotificationEffect {
        if self.status == next {
            let new_transaction = transaction_id.is_some_and(|t| t != self.transaction_id);
            let new_fraud = fraud_status.is_some_and(|f| self.fraud_status.as_deref() != Some(f));
            if new_transaction || new_fraud {
                NotificationEffect::Refresh
            } else {
                NotificationEffect::Unchanged
            }
        } else if self.status.can_transition_to(next) {
            NotificationEffect::Transition
        } else {
            NotificationEffect::Disallowed
        }
    }
}

/// Values persisted for a confirmed charge.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: String,
    pub transaction_id: String,
    pub donor_id: Uuid,
    pub method: PaymentMethod,
    pub bank: Option<Bank>,
    pub payment_type: Option<String>,
    pub va_number: Option<String>,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub fraud_status: Option<String>,
    pub approval_code: Option<String>,
    pub transaction_time: Option<DateTime<Utc>>,
}

fn validate_method_bank(payload: &CreatePaymentPayload) -> Result<(), ValidationError> {
    match (payload.method, payload.bank) {
        (PaymentMethod::BankTransfer, None) => {
            let mut err = ValidationError::new("bank_required");
            err.message = Some("Bank is required for bank_transfer.".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_method_bank"))]
pub struct CreatePaymentPayload {
    pub donor_id: Uuid,
    pub method: PaymentMethod,
    /// Required when `method` is `bank_transfer`.
    pub bank: Option<Bank>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[serde(flatten)]
    pub payment: Payment,
    /// QR / deeplink URL returned by the gateway, when any.
    pub redirect_url: Option<String>,
}

/// Asynchronous status callback body. Field names follow the gateway.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentNotification {
    pub order_id: String,
    pub status_code: String,
    /// Kept as the literal string sent, it is part of the signed message.
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    pub transaction_id: Option<String>,
    pub fraud_status: Option<String>,
}

// --- Reconciliation views ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundingStatus {
    Unpaid,
    FullyFunded,
    OverTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    Unpaid,
    Partial,
    Paid,
    OverPaid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimalFunding {
    pub animal_id: Uuid,
    pub kind: AnimalKind,
    pub is_private: bool,
    pub target: Decimal,
    pub collected: Decimal,
    pub status: FundingStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonorProgress {
    pub donor_id: Uuid,
    pub donor_name: Option<String>,
    pub total_porsi: Decimal,
    pub billed: Decimal,
    pub paid: Decimal,
    /// paid / billed, four decimal places. Zero when nothing is billed.
    pub progress: Decimal,
    pub status: ProgressStatus,
}

/// Sum of a donor's settled payment amounts.
#[derive(Debug, Clone, FromRow)]
pub struct DonorSettlement {
    pub donor_id: Uuid,
    pub settled_amount: Decimal,
}

/// How a donor's paid total is derived in the progress view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaidAttribution {
    /// Σ porsi × price of the donor's shares once any settled payment exists.
    #[default]
    Ledger,
    /// Σ of the donor's own settled payment amounts.
    Direct,
}

impl FromStr for PaidAttribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ledger" => Ok(PaidAttribution::Ledger),
            "direct" => Ok(PaidAttribution::Direct),
            other => Err(format!("unknown paid attribution '{}' (expected ledger or direct)", other)),
        }
    }
}

/// `ORDER-YYYYMMDD-<8 hex>`.
pub fn generate_order_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ORDER-{}-{}", now.format("%Y%m%d"), &suffix[..8])
}
