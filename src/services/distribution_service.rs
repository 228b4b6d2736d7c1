// src/services/distribution_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AnimalRepository, DistributionRepository, RecipientRepository, SlaughterRepository},
    models::{
        distribution::{CreateDistributionPayload, DistributionDetail, PackageTotal},
        recipient::Recipient,
    },
};

#[derive(Clone)]
pub struct DistributionService {
    pool: PgPool,
    distribution_repo: DistributionRepository,
    recipient_repo: RecipientRepository,
    animal_repo: AnimalRepository,
    slaughter_repo: SlaughterRepository,
}

impl DistributionService {
    pub fn new(
        pool: PgPool,
        distribution_repo: DistributionRepository,
        recipient_repo: RecipientRepository,
        animal_repo: AnimalRepository,
        slaughter_repo: SlaughterRepository,
    ) -> Self {
        Self { pool, distribution_repo, recipient_repo, animal_repo, slaughter_repo }
    }

    /// Meat can only be handed out from an animal that has been slaughtered,
    /// and each recipient receives once.
    pub async fn create_distribution(&self, payload: CreateDistributionPayload) -> Result<DistributionDetail, AppError> {
        if payload.package_count < 1 {
            return Err(AppError::Validation("Package count must be at least 1".into()));
        }

        let mut tx = self.pool.begin().await?;

        let recipient = self.recipient_repo
            .find_by_id(&mut *tx, payload.recipient_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipient"))?;

        self.animal_repo
            .find_by_id(&mut *tx, payload.animal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Animal"))?;

        if self.slaughter_repo.find_by_animal(&mut *tx, payload.animal_id).await?.is_none() {
            return Err(AppError::Validation("Animal has not been slaughtered yet".into()));
        }

        if self.distribution_repo.find_by_recipient(&mut *tx, recipient.id).await?.is_some() {
            return Err(AppError::Conflict("Recipient has already received a distribution".into()));
        }

        let distribution = self.distribution_repo
            .create(
                &mut *tx,
                recipient.id,
                payload.animal_id,
                payload.package_count,
                payload.distributed_on,
            )
            .await?;
        tx.commit().await?;

        tracing::info!(
            recipient_id = %recipient.id,
            animal_id = %distribution.animal_id,
            packages = distribution.package_count,
            "Distribution recorded"
        );
        Ok(DistributionDetail {
            distribution,
            recipient_name: recipient.name,
        })
    }

    pub async fn get_distribution(&self, id: Uuid) -> Result<DistributionDetail, AppError> {
        self.distribution_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Distribution"))
    }

    pub async fn list_distributions(&self) -> Result<Vec<DistributionDetail>, AppError> {
        self.distribution_repo.list().await
    }

    pub async fn total_packages(&self) -> Result<PackageTotal, AppError> {
        let total_packages = self.distribution_repo.total_packages().await?;
        Ok(PackageTotal { total_packages })
    }

    pub async fn unserved_recipients(&self) -> Result<Vec<Recipient>, AppError> {
        self.recipient_repo.list_unserved().await
    }

    pub async fn delete_distribution(&self, id: Uuid) -> Result<(), AppError> {
        let affected = self.distribution_repo.delete(&self.pool, id).await?;
        if affected == 0 {
            return Err(AppError::not_found("Distribution"));
        }
        Ok(())
    }
}
