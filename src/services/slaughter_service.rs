// src/services/slaughter_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AnimalRepository, PaymentRepository, ShareRepository, SlaughterRepository},
    models::slaughter::{CreateSlaughterPayload, SlaughterRecord, UpdateSlaughterPayload},
    services::reconciliation,
};

#[derive(Clone)]
pub struct SlaughterService {
    pool: PgPool,
    slaughter_repo: SlaughterRepository,
    animal_repo: AnimalRepository,
    share_repo: ShareRepository,
    payment_repo: PaymentRepository,
}

impl SlaughterService {
    pub fn new(
        pool: PgPool,
        slaughter_repo: SlaughterRepository,
        animal_repo: AnimalRepository,
        share_repo: ShareRepository,
        payment_repo: PaymentRepository,
    ) -> Self {
        Self { pool, slaughter_repo, animal_repo, share_repo, payment_repo }
    }

    /// Schedules a slaughter. Refused with NotFullyPaid until the animal
    /// passes the funding gate.
    pub async fn create_record(&self, payload: CreateSlaughterPayload) -> Result<SlaughterRecord, AppError> {
        let location = payload.location.trim();
        if location.is_empty() {
            return Err(AppError::Validation("Location is required".into()));
        }
        let planned_order = payload.planned_order.unwrap_or(1);
        if planned_order < 1 {
            return Err(AppError::Validation("Planned order must be at least 1".into()));
        }

        let mut tx = self.pool.begin().await?;

        let animal = self.animal_repo
            .find_by_id_for_update(&mut *tx, payload.animal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Animal"))?;

        if self.slaughter_repo.find_by_animal(&mut *tx, animal.id).await?.is_some() {
            return Err(AppError::Conflict("Animal already has a slaughter record".into()));
        }

        let holdings = self.share_repo.holdings_of_co_owners(&mut *tx, animal.id).await?;
        let settlements = self.payment_repo.settled_by_donor(&mut *tx).await?;
        let coverage = reconciliation::settled_coverage(&holdings, &settlements);
        let shares: Vec<_> = holdings.iter().filter(|h| h.animal_id == animal.id).collect();
        let funding = reconciliation::fund_animal(&animal, &shares, &coverage);

        if !reconciliation::is_eligible_for_slaughter(&funding) {
            tracing::warn!(
                animal_id = %animal.id,
                collected = %funding.collected,
                target = %funding.target,
                "Slaughter refused, animal not fully paid"
            );
            return Err(AppError::NotFullyPaid(animal.id));
        }

        let record = self.slaughter_repo
            .create(&mut *tx, animal.id, payload.scheduled_at, location, planned_order)
            .await?;
        tx.commit().await?;

        tracing::info!(animal_id = %animal.id, record_id = %record.id, "✅ Slaughter scheduled");
        Ok(record)
    }

    pub async fn get_record(&self, id: Uuid) -> Result<SlaughterRecord, AppError> {
        self.slaughter_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Slaughter record"))
    }

    pub async fn list_records(&self) -> Result<Vec<SlaughterRecord>, AppError> {
        self.slaughter_repo.list().await
    }

    pub async fn update_record(&self, id: Uuid, payload: UpdateSlaughterPayload) -> Result<SlaughterRecord, AppError> {
        let current = self.get_record(id).await?;

        let location = match payload.location {
            Some(l) if l.trim().is_empty() => {
                return Err(AppError::Validation("Location cannot be empty".into()));
            }
            Some(l) => l.trim().to_string(),
            None => current.location.clone(),
        };

        let next = SlaughterRecord {
            scheduled_at: payload.scheduled_at.unwrap_or(current.scheduled_at),
            location,
            planned_order: payload.planned_order.unwrap_or(current.planned_order),
            actual_order: payload.actual_order.or(current.actual_order),
            ..current
        };

        self.slaughter_repo.update(&self.pool, &next).await
    }

    pub async fn delete_record(&self, id: Uuid) -> Result<(), AppError> {
        let affected = self.slaughter_repo.delete(&self.pool, id).await?;
        if affected == 0 {
            return Err(AppError::not_found("Slaughter record"));
        }
        Ok(())
    }
}
