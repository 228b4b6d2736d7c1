// src/services/share_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AnimalRepository, DonorRepository, ShareRepository},
    models::{
        auth::{Role, User},
        share::{CreateSharePayload, ShareResponse, UpdateSharePayload},
    },
    services::{
        ledger::{self, LedgerMutation},
        policy,
    },
};

#[derive(Clone)]
pub struct ShareService {
    pool: PgPool,
    share_repo: ShareRepository,
    animal_repo: AnimalRepository,
    donor_repo: DonorRepository,
}

impl ShareService {
    pub fn new(
        pool: PgPool,
        share_repo: ShareRepository,
        animal_repo: AnimalRepository,
        donor_repo: DonorRepository,
    ) -> Self {
        Self { pool, share_repo, animal_repo, donor_repo }
    }

    // =========================================================================
    //  MUTATIONS
    //  Read-check-write happens in one transaction holding the animal row lock,
    //  so concurrent mutations on the same animal are serialized.
    // =========================================================================

    pub async fn create_share(&self, actor: &User, payload: CreateSharePayload) -> Result<ShareResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let donor = self.donor_repo
            .find_by_id(&mut *tx, payload.donor_id)
            .await?
            .ok_or_else(|| AppError::not_found("Donor"))?;
        policy::ensure_can_act_for_donor(actor, &donor)?;

        let animal = self.animal_repo
            .find_by_id_for_update(&mut *tx, payload.animal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Animal"))?;

        let porsi = ledger::porsi_for(&animal, payload.headcount)?;
        let existing = self.share_repo.list_for_animal(&mut *tx, animal.id).await?;
        ledger::ensure_capacity(&animal, &existing, donor.id, porsi, LedgerMutation::Create)?;

        self.share_repo.insert(&mut *tx, donor.id, animal.id, porsi).await?;
        tx.commit().await?;

        tracing::info!(
            donor_id = %donor.id,
            animal_id = %animal.id,
            sevenths = porsi.sevenths(),
            "✅ Ownership share created"
        );
        Ok(ShareResponse::new(donor.id, donor.name, animal.id, animal.kind, porsi))
    }

    pub async fn update_share(
        &self,
        actor: &User,
        donor_id: Uuid,
        animal_id: Uuid,
        payload: UpdateSharePayload,
    ) -> Result<ShareResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let donor = self.donor_repo
            .find_by_id(&mut *tx, donor_id)
            .await?
            .ok_or_else(|| AppError::not_found("Donor"))?;
        policy::ensure_can_act_for_donor(actor, &donor)?;

        let animal = self.animal_repo
            .find_by_id_for_update(&mut *tx, animal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Animal"))?;

        let porsi = ledger::porsi_for(&animal, payload.headcount)?;
        let existing = self.share_repo.list_for_animal(&mut *tx, animal.id).await?;
        ledger::ensure_capacity(&animal, &existing, donor.id, porsi, LedgerMutation::Replace)?;

        self.share_repo
            .update_porsi(&mut *tx, donor.id, animal.id, porsi)
            .await?
            .ok_or_else(|| AppError::not_found("Ownership share"))?;
        tx.commit().await?;

        tracing::info!(
            donor_id = %donor.id,
            animal_id = %animal.id,
            sevenths = porsi.sevenths(),
            "Ownership share updated"
        );
        Ok(ShareResponse::new(donor.id, donor.name, animal.id, animal.kind, porsi))
    }

    pub async fn delete_share(&self, donor_id: Uuid, animal_id: Uuid) -> Result<(), AppError> {
        let affected = self.share_repo.delete(&self.pool, donor_id, animal_id).await?;
        if affected == 0 {
            return Err(AppError::not_found("Ownership share"));
        }

        tracing::info!(donor_id = %donor_id, animal_id = %animal_id, "Ownership share deleted");
        Ok(())
    }

    // =========================================================================
    //  PROJECTIONS
    // =========================================================================

    /// Staff see the whole ledger, a user only its own shares.
    pub async fn list_shares(&self, actor: &User) -> Result<Vec<ShareResponse>, AppError> {
        let details = match actor.role {
            Role::Admin | Role::Panitia => self.share_repo.list_details().await?,
            Role::User => match self.donor_repo.find_by_user_id(&self.pool, actor.id).await? {
                Some(donor) => self.share_repo.list_details_by_donor(donor.id).await?,
                None => Vec::new(),
            },
        };
        Ok(details.into_iter().map(ShareResponse::from).collect())
    }

    pub async fn list_by_animal(&self, animal_id: Uuid) -> Result<Vec<ShareResponse>, AppError> {
        self.animal_repo
            .find_by_id(&self.pool, animal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Animal"))?;

        let details = self.share_repo.list_details_by_animal(animal_id).await?;
        Ok(details.into_iter().map(ShareResponse::from).collect())
    }

    pub async fn list_by_donor(&self, actor: &User, donor_id: Uuid) -> Result<Vec<ShareResponse>, AppError> {
        let donor = self.donor_repo
            .find_by_id(&self.pool, donor_id)
            .await?
            .ok_or_else(|| AppError::not_found("Donor"))?;
        policy::ensure_can_view_donor(actor, &donor)?;

        let details = self.share_repo.list_details_by_donor(donor_id).await?;
        Ok(details.into_iter().map(ShareResponse::from).collect())
    }
}
