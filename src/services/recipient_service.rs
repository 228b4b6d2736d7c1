// src/services/recipient_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DistributionRepository, DonorRepository, RecipientRepository},
    models::recipient::{CreateRecipientPayload, Recipient, UpdateRecipientPayload},
};

#[derive(Clone)]
pub struct RecipientService {
    pool: PgPool,
    recipient_repo: RecipientRepository,
    donor_repo: DonorRepository,
    distribution_repo: DistributionRepository,
}

fn filled(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl RecipientService {
    pub fn new(
        pool: PgPool,
        recipient_repo: RecipientRepository,
        donor_repo: DonorRepository,
        distribution_repo: DistributionRepository,
    ) -> Self {
        Self { pool, recipient_repo, donor_repo, distribution_repo }
    }

    // Missing contact fields are taken from the linked donor
    pub async fn create_recipient(&self, payload: CreateRecipientPayload) -> Result<Recipient, AppError> {
        let mut name = filled(payload.name);
        let mut address = filled(payload.address);
        let mut phone = filled(payload.phone);

        if let Some(donor_id) = payload.donor_id {
            let donor = self.donor_repo
                .find_by_id(&self.pool, donor_id)
                .await?
                .ok_or_else(|| AppError::not_found("Donor"))?;
            name = name.or(donor.name);
            address = address.or(donor.address);
            phone = phone.or(donor.phone);
        }

        let name = name.ok_or_else(|| AppError::Validation("Name is required".into()))?;

        let recipient = self.recipient_repo
            .create(
                &self.pool,
                &name,
                address.as_deref(),
                phone.as_deref(),
                payload.category,
                payload.donor_id,
            )
            .await?;

        tracing::info!(recipient_id = %recipient.id, category = ?recipient.category, "Recipient registered");
        Ok(recipient)
    }

    pub async fn get_recipient(&self, id: Uuid) -> Result<Recipient, AppError> {
        self.recipient_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipient"))
    }

    pub async fn list_recipients(&self) -> Result<Vec<Recipient>, AppError> {
        self.recipient_repo.list().await
    }

    pub async fn update_recipient(&self, id: Uuid, payload: UpdateRecipientPayload) -> Result<Recipient, AppError> {
        let current = self.get_recipient(id).await?;

        let next = Recipient {
            name: filled(payload.name).unwrap_or_else(|| current.name.clone()),
            address: filled(payload.address).or(current.address.clone()),
            phone: filled(payload.phone).or(current.phone.clone()),
            category: payload.category.unwrap_or(current.category),
            ..current
        };

        self.recipient_repo.update(&self.pool, &next).await
    }

    pub async fn delete_recipient(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if self.distribution_repo.find_by_recipient(&mut *tx, id).await?.is_some() {
            return Err(AppError::Conflict("Recipient already has a distribution".into()));
        }

        let affected = self.recipient_repo.delete(&mut *tx, id).await?;
        if affected == 0 {
            return Err(AppError::not_found("Recipient"));
        }

        tx.commit().await?;
        Ok(())
    }
}
