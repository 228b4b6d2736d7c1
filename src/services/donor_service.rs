// src/services/donor_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DonorRepository, UserRepository},
    models::{
        auth::{Role, User},
        donor::{CreateDonorPayload, Donor, UpdateDonorPayload},
    },
    services::policy,
};

#[derive(Clone)]
pub struct DonorService {
    pool: PgPool,
    donor_repo: DonorRepository,
    user_repo: UserRepository,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl DonorService {
    pub fn new(pool: PgPool, donor_repo: DonorRepository, user_repo: UserRepository) -> Self {
        Self { pool, donor_repo, user_repo }
    }

    pub async fn create_donor(&self, actor: &User, payload: CreateDonorPayload) -> Result<Donor, AppError> {
        let user_id = match actor.role {
            Role::User => Some(actor.id),
            Role::Admin | Role::Panitia => payload.user_id,
        };

        let mut tx = self.pool.begin().await?;

        let mut name = non_blank(payload.name);
        let mut email = non_blank(payload.email);

        if let Some(uid) = user_id {
            let user = self.user_repo
                .find_by_id(&mut *tx, uid)
                .await?
                .ok_or(AppError::UserNotFound)?;

            if self.donor_repo.find_by_user_id(&mut *tx, uid).await?.is_some() {
                return Err(AppError::Conflict("This user is already registered as a donor".into()));
            }

            name = name.or(Some(user.name));
            email = email.or(Some(user.email));
        }

        let name = name.ok_or_else(|| AppError::Validation("Name is required".into()))?;

        let donor = self.donor_repo
            .create(
                &mut *tx,
                user_id,
                Some(&name),
                payload.phone.trim(),
                email.as_deref(),
                payload.address.trim(),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(donor_id = %donor.id, offline = donor.is_offline(), "Donor registered");
        Ok(donor)
    }

    pub async fn get_donor(&self, actor: &User, id: Uuid) -> Result<Donor, AppError> {
        let donor = self.find(id).await?;
        policy::ensure_can_view_donor(actor, &donor)?;
        Ok(donor)
    }

    pub async fn get_my_donor(&self, actor: &User) -> Result<Donor, AppError> {
        self.donor_repo
            .find_by_user_id(&self.pool, actor.id)
            .await?
            .ok_or_else(|| AppError::not_found("Donor"))
    }

    pub async fn list_donors(&self) -> Result<Vec<Donor>, AppError> {
        self.donor_repo.list(&self.pool).await
    }

    pub async fn update_donor(&self, actor: &User, id: Uuid, payload: UpdateDonorPayload) -> Result<Donor, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self.donor_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Donor"))?;
        policy::ensure_can_act_for_donor(actor, &current)?;

        if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::Validation("Name cannot be empty".into()));
        }

        let next = Donor {
            name: non_blank(payload.name).or(current.name.clone()),
            phone: non_blank(payload.phone).or(current.phone.clone()),
            email: non_blank(payload.email).or(current.email.clone()),
            address: non_blank(payload.address).or(current.address.clone()),
            ..current
        };

        let donor = self.donor_repo.update(&mut *tx, &next).await?;
        tx.commit().await?;
        Ok(donor)
    }

    pub async fn delete_donor(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.donor_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Donor"))?;

        let refs = self.donor_repo.count_references(&mut *tx, id).await?;
        if refs.shares > 0 || refs.payments > 0 {
            return Err(AppError::Conflict(format!(
                "Donor is still referenced ({} shares, {} payments)",
                refs.shares, refs.payments
            )));
        }

        self.donor_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(donor_id = %id, "Donor deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Donor, AppError> {
        self.donor_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Donor"))
    }
}
