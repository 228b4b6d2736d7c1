// src/db/share_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::share::{Holding, OwnershipShare, Porsi, ShareDetail},
};

const DETAIL_SELECT: &str = r#"
    SELECT s.donor_id, d.name AS donor_name, s.animal_id, a.kind AS animal_kind, s.porsi_sevenths
    FROM ownership_shares s
    JOIN donors d ON d.id = s.donor_id
    JOIN animals a ON a.id = s.animal_id
"#;

const HOLDING_SELECT: &str = r#"
    SELECT s.donor_id, s.animal_id, a.kind AS animal_kind, a.price, a.is_private, s.porsi_sevenths
    FROM ownership_shares s
    JOIN animals a ON a.id = s.animal_id
"#;

#[derive(Clone)]
pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEDGER ROWS
    // =========================================================================

    pub async fn list_for_animal<'e, E>(&self, executor: E, animal_id: Uuid) -> Result<Vec<OwnershipShare>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shares = sqlx::query_as::<_, OwnershipShare>(
            r#"
            SELECT donor_id, animal_id, porsi_sevenths, created_at, updated_at
            FROM ownership_shares
            WHERE animal_id = $1
            "#,
        )
            .bind(animal_id)
            .fetch_all(executor)
            .await?;
        Ok(shares)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        donor_id: Uuid,
        animal_id: Uuid,
        porsi: Porsi,
    ) -> Result<OwnershipShare, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let share = sqlx::query_as::<_, OwnershipShare>(
            r#"
            INSERT INTO ownership_shares (donor_id, animal_id, porsi_sevenths)
            VALUES ($1, $2, $3)
            RETURNING donor_id, animal_id, porsi_sevenths, created_at, updated_at
            "#,
        )
            .bind(donor_id)
            .bind(animal_id)
            .bind(porsi.sevenths())
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_constraint(e, "Donor already holds a share of this animal"))?;
        Ok(share)
    }

    pub async fn update_porsi<'e, E>(
        &self,
        executor: E,
        donor_id: Uuid,
        animal_id: Uuid,
        porsi: Porsi,
    ) -> Result<Option<OwnershipShare>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let share = sqlx::query_as::<_, OwnershipShare>(
            r#"
            UPDATE ownership_shares
            SET porsi_sevenths = $3, updated_at = now()
            WHERE donor_id = $1 AND animal_id = $2
            RETURNING donor_id, animal_id, porsi_sevenths, created_at, updated_at
            "#,
        )
            .bind(donor_id)
            .bind(animal_id)
            .bind(porsi.sevenths())
            .fetch_optional(executor)
            .await?;
        Ok(share)
    }

    pub async fn delete<'e, E>(&self, executor: E, donor_id: Uuid, animal_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM ownership_shares WHERE donor_id = $1 AND animal_id = $2")
            .bind(donor_id)
            .bind(animal_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  PROJECTIONS
    // =========================================================================

    pub async fn list_details(&self) -> Result<Vec<ShareDetail>, AppError> {
        let query = format!("{} ORDER BY s.created_at", DETAIL_SELECT);
        let details = sqlx::query_as::<_, ShareDetail>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(details)
    }

    pub async fn list_details_by_animal(&self, animal_id: Uuid) -> Result<Vec<ShareDetail>, AppError> {
        let query = format!("{} WHERE s.animal_id = $1 ORDER BY s.created_at", DETAIL_SELECT);
        let details = sqlx::query_as::<_, ShareDetail>(&query)
            .bind(animal_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(details)
    }

    pub async fn list_details_by_donor(&self, donor_id: Uuid) -> Result<Vec<ShareDetail>, AppError> {
        let query = format!("{} WHERE s.donor_id = $1 ORDER BY s.created_at", DETAIL_SELECT);
        let details = sqlx::query_as::<_, ShareDetail>(&query)
            .bind(donor_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(details)
    }

    // =========================================================================
    //  HOLDINGS (shares priced by their animal)
    // =========================================================================

    pub async fn holdings_for_donor<'e, E>(&self, executor: E, donor_id: Uuid) -> Result<Vec<Holding>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("{} WHERE s.donor_id = $1", HOLDING_SELECT);
        let holdings = sqlx::query_as::<_, Holding>(&query)
            .bind(donor_id)
            .fetch_all(executor)
            .await?;
        Ok(holdings)
    }

    /// Every holding of the donors that own a share of `animal_id`, on any animal.
    pub async fn holdings_of_co_owners<'e, E>(&self, executor: E, animal_id: Uuid) -> Result<Vec<Holding>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "{} WHERE s.donor_id IN (SELECT donor_id FROM ownership_shares WHERE animal_id = $1)",
            HOLDING_SELECT
        );
        let holdings = sqlx::query_as::<_, Holding>(&query)
            .bind(animal_id)
            .fetch_all(executor)
            .await?;
        Ok(holdings)
    }

    pub async fn all_holdings<'e, E>(&self, executor: E) -> Result<Vec<Holding>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let holdings = sqlx::query_as::<_, Holding>(HOLDING_SELECT)
            .fetch_all(executor)
            .await?;
        Ok(holdings)
    }
}
