// src/models/slaughter.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlaughterRecord {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    #[schema(example = "Halaman Masjid Al-Ikhlas")]
    pub location: String,
    #[schema(example = 1)]
    pub planned_order: i32,
    pub actual_order: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlaughterPayload {
    pub animal_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    #[validate(length(min = 1, message = "Location is required."))]
    pub location: String,
    #[validate(range(min = 1, message = "Planned order must be at least 1."))]
    pub planned_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlaughterPayload {
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "Location is required."))]
    pub location: Option<String>,
    #[validate(range(min = 1, message = "Planned order must be at least 1."))]
    pub planned_order: Option<i32>,
    #[validate(range(min = 1, message = "Actual order must be at least 1."))]
    pub actual_order: Option<i32>,
}
