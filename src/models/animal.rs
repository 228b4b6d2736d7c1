// src/models/animal.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "animal_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnimalKind {
    /// Cattle-class: may be split among up to seven donors.
    Sapi,
    Kambing,
    Domba,
}

impl AnimalKind {
    pub fn is_shareable(self) -> bool {
        match self {
            AnimalKind::Sapi => true,
            AnimalKind::Kambing | AnimalKind::Domba => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: Uuid,
    pub kind: AnimalKind,
    #[schema(example = "350.5")]
    pub weight: Decimal,
    /// Funding target. Zero for privately owned animals.
    #[schema(example = "21000000")]
    pub price: Decimal,
    pub is_private: bool,
    pub registered_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimalResponse {
    #[serde(flatten)]
    pub animal: Animal,
    pub is_slaughtered: bool,
}

/// Rows that block deletion of an animal.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct AnimalReferences {
    pub shares: i64,
    pub slaughter_records: i64,
    pub distributions: i64,
}

impl AnimalReferences {
    pub fn is_referenced(&self) -> bool {
        self.shares > 0 || self.slaughter_records > 0 || self.distributions > 0
    }
}

pub(crate) fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("Value must be greater than zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnimalPayload {
    pub kind: AnimalKind,

    #[validate(custom(function = "validate_positive"))]
    pub weight: Decimal,

    /// Required (> 0) unless the animal is private.
    pub price: Option<Decimal>,

    #[serde(default)]
    pub is_private: bool,

    pub registered_on: NaiveDate,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnimalPayload {
    pub kind: Option<AnimalKind>,
    #[validate(custom(function = "validate_positive"))]
    pub weight: Option<Decimal>,
    pub price: Option<Decimal>,
    pub is_private: Option<bool>,
    pub registered_on: Option<NaiveDate>,
}
