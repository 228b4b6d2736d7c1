// src/services/animal_service.rs

use std::collections::HashSet;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AnimalRepository, ShareRepository, SlaughterRepository},
    models::animal::{Animal, AnimalResponse, CreateAnimalPayload, UpdateAnimalPayload},
};

#[derive(Clone)]
pub struct AnimalService {
    pool: PgPool,
    animal_repo: AnimalRepository,
    share_repo: ShareRepository,
    slaughter_repo: SlaughterRepository,
}

/// Private animals are not pooled and carry no price; all others need one.
fn resolve_price(is_private: bool, price: Option<Decimal>) -> Result<Decimal, AppError> {
    if is_private {
        return Ok(Decimal::ZERO);
    }
    match price {
        Some(p) if p > Decimal::ZERO => Ok(p),
        _ => Err(AppError::Validation(
            "Price must be greater than zero for a non-private animal".into(),
        )),
    }
}

impl AnimalService {
    pub fn new(
        pool: PgPool,
        animal_repo: AnimalRepository,
        share_repo: ShareRepository,
        slaughter_repo: SlaughterRepository,
    ) -> Self {
        Self { pool, animal_repo, share_repo, slaughter_repo }
    }

    pub async fn create_animal(&self, payload: CreateAnimalPayload) -> Result<AnimalResponse, AppError> {
        let price = resolve_price(payload.is_private, payload.price)?;

        let animal = self.animal_repo
            .create(
                &self.pool,
                payload.kind,
                payload.weight,
                price,
                payload.is_private,
                payload.registered_on,
            )
            .await?;

        tracing::info!(animal_id = %animal.id, kind = ?animal.kind, "Animal registered");
        Ok(AnimalResponse { animal, is_slaughtered: false })
    }

    pub async fn get_animal(&self, id: Uuid) -> Result<AnimalResponse, AppError> {
        let animal = self.animal_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Animal"))?;

        let is_slaughtered = self.slaughter_repo
            .find_by_animal(&self.pool, id)
            .await?
            .is_some();

        Ok(AnimalResponse { animal, is_slaughtered })
    }

    pub async fn list_animals(&self) -> Result<Vec<AnimalResponse>, AppError> {
        let animals = self.animal_repo.list(&self.pool).await?;
        let slaughtered: HashSet<Uuid> = self.slaughter_repo
            .slaughtered_animal_ids()
            .await?
            .into_iter()
            .collect();

        Ok(animals
            .into_iter()
            .map(|animal| {
                let is_slaughtered = slaughtered.contains(&animal.id);
                AnimalResponse { animal, is_slaughtered }
            })
            .collect())
    }

    pub async fn update_animal(&self, id: Uuid, payload: UpdateAnimalPayload) -> Result<AnimalResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self.animal_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Animal"))?;

        let kind = payload.kind.unwrap_or(current.kind);
        let is_private = payload.is_private.unwrap_or(current.is_private);

        if kind != current.kind || is_private != current.is_private {
            let shares = self.share_repo.list_for_animal(&mut *tx, id).await?;
            if !shares.is_empty() {
                return Err(AppError::Conflict(
                    "Kind and privacy cannot change while the animal has ownership shares".into(),
                ));
            }
        }

        // Keep the stored price when switching back to non-private without a new one
        let requested_price = payload.price.or_else(|| (!current.is_private).then_some(current.price));
        let price = resolve_price(is_private, requested_price)?;

        let next = Animal {
            kind,
            is_private,
            price,
            weight: payload.weight.unwrap_or(current.weight),
            registered_on: payload.registered_on.unwrap_or(current.registered_on),
            ..current
        };

        let animal = self.animal_repo.update(&mut *tx, &next).await?;
        let is_slaughtered = self.slaughter_repo
            .find_by_animal(&mut *tx, id)
            .await?
            .is_some();

        tx.commit().await?;
        Ok(AnimalResponse { animal, is_slaughtered })
    }

    pub async fn delete_animal(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.animal_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Animal"))?;

        let refs = self.animal_repo.count_references(&mut *tx, id).await?;
        if refs.is_referenced() {
            return Err(AppError::Conflict(format!(
                "Animal is still referenced ({} shares, {} slaughter records, {} distributions)",
                refs.shares, refs.slaughter_records, refs.distributions
            )));
        }

        self.animal_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(animal_id = %id, "Animal deleted");
        Ok(())
    }
}
