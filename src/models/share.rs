// src/models/share.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::animal::AnimalKind;

/// Number of porsi units in one whole animal. A sapi is split among at most
/// seven donors, so porsi is always a whole number of sevenths.
pub const SEVENTHS_PER_ANIMAL: i16 = 7;

/// Fractional ownership of an animal, kept exactly as a count of sevenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Porsi(i16);

impl Porsi {
    pub const WHOLE: Porsi = Porsi(SEVENTHS_PER_ANIMAL);

    pub fn from_sevenths(sevenths: i16) -> Option<Self> {
        (1..=SEVENTHS_PER_ANIMAL)
            .contains(&sevenths)
            .then_some(Porsi(sevenths))
    }

    // The table's check constraint keeps stored values in 1..=7.
    pub(crate) fn from_stored(sevenths: i16) -> Self {
        Porsi(sevenths.clamp(1, SEVENTHS_PER_ANIMAL))
    }

    pub fn sevenths(self) -> i16 {
        self.0
    }

    pub fn is_whole(self) -> bool {
        self.0 == SEVENTHS_PER_ANIMAL
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(SEVENTHS_PER_ANIMAL)
    }

    /// `porsi × price`, multiplied before dividing so whole sevenths of a
    /// price divisible by seven stay exact.
    pub fn value_of(self, price: Decimal) -> Decimal {
        price * Decimal::from(self.0) / Decimal::from(SEVENTHS_PER_ANIMAL)
    }

    /// Number of people the share stands for, as shown to clients.
    pub fn headcount(self, kind: AnimalKind) -> i16 {
        if kind.is_shareable() { self.0 } else { 1 }
    }
}

/// Row of the ownership ledger (`ownership_shares`).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipShare {
    pub donor_id: Uuid,
    pub animal_id: Uuid,
    pub porsi_sevenths: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnershipShare {
    pub fn porsi(&self) -> Porsi {
        Porsi::from_stored(self.porsi_sevenths)
    }
}

/// Ledger row joined with donor name and animal kind, for listings.
#[derive(Debug, Clone, FromRow)]
pub struct ShareDetail {
    pub donor_id: Uuid,
    pub donor_name: Option<String>,
    pub animal_id: Uuid,
    pub animal_kind: AnimalKind,
    pub porsi_sevenths: i16,
}

/// Ledger row joined with the animal's pricing, used for billing and
/// reconciliation.
#[derive(Debug, Clone, FromRow)]
pub struct Holding {
    pub donor_id: Uuid,
    pub animal_id: Uuid,
    pub animal_kind: AnimalKind,
    pub price: Decimal,
    pub is_private: bool,
    pub porsi_sevenths: i16,
}

impl Holding {
    pub fn porsi(&self) -> Porsi {
        Porsi::from_stored(self.porsi_sevenths)
    }

    /// What this share bills. Private animals are not pooled and bill nothing.
    pub fn billed_value(&self) -> Decimal {
        if self.is_private {
            Decimal::ZERO
        } else {
            self.porsi().value_of(self.price)
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub donor_id: Uuid,
    pub donor_name: Option<String>,
    pub animal_id: Uuid,
    pub animal_kind: AnimalKind,
    #[schema(example = "0.4285714285714285714285714286")]
    pub porsi: Decimal,
    #[schema(example = 3)]
    pub headcount: i16,
}

impl ShareResponse {
    pub fn new(
        donor_id: Uuid,
        donor_name: Option<String>,
        animal_id: Uuid,
        animal_kind: AnimalKind,
        porsi: Porsi,
    ) -> Self {
        Self {
            donor_id,
            donor_name,
            animal_id,
            animal_kind,
            porsi: porsi.as_decimal(),
            headcount: porsi.headcount(animal_kind),
        }
    }
}

impl From<ShareDetail> for ShareResponse {
    fn from(d: ShareDetail) -> Self {
        let porsi = Porsi::from_stored(d.porsi_sevenths);
        Self::new(d.donor_id, d.donor_name, d.animal_id, d.animal_kind, porsi)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSharePayload {
    pub donor_id: Uuid,
    pub animal_id: Uuid,
    /// Required for a shared sapi; may be omitted for whole-animal ownership.
    #[validate(range(min = 1, max = 7, message = "Headcount must be between 1 and 7."))]
    pub headcount: Option<i16>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSharePayload {
    #[validate(range(min = 1, max = 7, message = "Headcount must be between 1 and 7."))]
    pub headcount: Option<i16>,
}
