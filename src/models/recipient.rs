// src/models/recipient.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "recipient_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecipientCategory {
    Warga,
    Dhuafa,
    Panitia,
    Pekurban,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub category: RecipientCategory,
    /// Set when the recipient is also a registered donor.
    pub donor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipientPayload {
    /// Copied from the linked donor when omitted.
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub category: RecipientCategory,
    pub donor_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipientPayload {
    #[validate(length(min = 1, message = "Name cannot be empty."))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub category: Option<RecipientCategory>,
}
