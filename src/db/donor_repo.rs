// src/db/donor_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::donor::{Donor, DonorReferences},
};

#[derive(Clone, Default)]
pub struct DonorRepository;

impl DonorRepository {
    pub fn new() -> Self {
        Self
    }

    // The partial unique index on user_id turns a second linked donor into a Conflict
    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Option<Uuid>,
        name: Option<&str>,
        phone: &str,
        email: Option<&str>,
        address: &str,
    ) -> Result<Donor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let donor = sqlx::query_as::<_, Donor>(
            r#"
            INSERT INTO donors (user_id, name, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(user_id)
            .bind(name)
            .bind(phone)
            .bind(email)
            .bind(address)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_constraint(e, "This user is already registered as a donor"))?;

        Ok(donor)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Donor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let donor = sqlx::query_as::<_, Donor>("SELECT * FROM donors WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(donor)
    }

    /// Serializes payment creation per donor.
    pub async fn find_by_id_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Donor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let donor = sqlx::query_as::<_, Donor>("SELECT * FROM donors WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(donor)
    }

    pub async fn find_by_user_id<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Option<Donor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let donor = sqlx::query_as::<_, Donor>("SELECT * FROM donors WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(donor)
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Donor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let donors = sqlx::query_as::<_, Donor>("SELECT * FROM donors ORDER BY created_at")
            .fetch_all(executor)
            .await?;
        Ok(donors)
    }

    pub async fn update<'e, E>(&self, executor: E, donor: &Donor) -> Result<Donor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Donor>(
            r#"
            UPDATE donors
            SET name = $2, phone = $3, email = $4, address = $5, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(donor.id)
            .bind(&donor.name)
            .bind(&donor.phone)
            .bind(&donor.email)
            .bind(&donor.address)
            .fetch_one(executor)
            .await?;
        Ok(updated)
    }

    pub async fn count_references<'e, E>(&self, executor: E, id: Uuid) -> Result<DonorReferences, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let refs = sqlx::query_as::<_, DonorReferences>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM ownership_shares WHERE donor_id = $1) AS shares,
                (SELECT COUNT(*) FROM payments WHERE donor_id = $1) AS payments
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
        let result = sqlx::query("DELETE FROM donors WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| AppError::from_constraint(e, "Donor is still referenced by other records"))?;
        Ok(result.rows_affected())
    }
}
