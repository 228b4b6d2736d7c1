// src/models/distribution.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub animal_id: Uuid,
    #[schema(example = 2)]
    pub package_count: i32,
    pub distributed_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Distribution joined with the recipient's name, for listings.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributionDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub distribution: Distribution,
    pub recipient_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDistributionPayload {
    pub recipient_id: Uuid,
    pub animal_id: Uuid,
    #[validate(range(min = 1, message = "Package count must be at least 1."))]
    pub package_count: i32,
    pub distributed_on: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageTotal {
    pub total_packages: i64,
}
