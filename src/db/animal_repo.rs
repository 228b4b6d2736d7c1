// src/db/animal_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::animal::{Animal, AnimalKind, AnimalReferences},
};

#[derive(Clone, Default)]
pub struct AnimalRepository;

impl AnimalRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        kind: AnimalKind,
        weight: Decimal,
        price: Decimal,
        is_private: bool,
        registered_on: NaiveDate,
    ) -> Result<Animal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let animal = sqlx::query_as::<_, Animal>(
            r#"
            INSERT INTO animals (kind, weight, price, is_private, registered_on)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(kind)
            .bind(weight)
            .bind(price)
            .bind(is_private)
            .bind(registered_on)
            .fetch_one(executor)
            .await?;

        Ok(animal)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Animal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let animal = sqlx::query_as::<_, Animal>("SELECT * FROM animals WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(animal)
    }

    /// Locks the animal row until the surrounding transaction ends. Every
    /// ownership mutation on the animal goes through this first.
    pub async fn find_by_id_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Animal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let animal = sqlx::query_as::<_, Animal>("SELECT * FROM animals WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(animal)
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Animal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let animals = sqlx::query_as::<_, Animal>("SELECT * FROM animals ORDER BY registered_on, created_at")
            .fetch_all(executor)
            .await?;
        Ok(animals)
    }

    pub async fn update<'e, E>(&self, executor: E, animal: &Animal) -> Result<Animal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Animal>(
            r#"
            UPDATE animals
            SET kind = $2, weight = $3, price = $4, is_private = $5,
                registered_on = $6, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(animal.id)
            .bind(animal.kind)
            .bind(animal.weight)
            .bind(animal.price)
            .bind(animal.is_private)
            .bind(animal.registered_on)
            .fetch_one(executor)
            .await?;
        Ok(updated)
    }

    pub async fn count_references<'e, E>(&self, executor: E, id: Uuid) -> Result<AnimalReferences, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let refs = sqlx::query_as::<_, AnimalReferences>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM ownership_shares WHERE animal_id = $1) AS shares,
                (SELECT COUNT(*) FROM slaughter_records WHERE animal_id = $1) AS slaughter_records,
                (SELECT COUNT(*) FROM distributions WHERE animal_id = $1) AS distributions
            "#,
        )
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(refs)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM animals WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| AppError::from_constraint(e, "Animal is still referenced by other records"))?;
        Ok(result.rows_affected())
    }
}
