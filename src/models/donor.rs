// src/models/donor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A pekurban. `user_id` is empty for walk-in donors registered by staff.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Donor {
    pub fn is_offline(&self) -> bool {
        self.user_id.is_none()
    }

    /// Name, e-mail and phone, all non-blank, as the gateway requires them.
    pub fn billing_contact(&self) -> Option<(&str, &str, &str)> {
        fn filled(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }
        Some((filled(&self.name)?, filled(&self.email)?, filled(&self.phone)?))
    }
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct DonorReferences {
    pub shares: i64,
    pub payments: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonorPayload {
    /// Ignored for `user` callers, whose own account is always linked.
    pub user_id: Option<Uuid>,
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Phone is required."))]
    pub phone: String,
    #[validate(email(message = "Invalid e-mail address."))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Address is required."))]
    pub address: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDonorPayload {
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid e-mail address."))]
    pub email: Option<String>,
    pub address: Option<String>,
}
