// src/db/distribution_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::distribution::{Distribution, DistributionDetail},
};

const DETAIL_SELECT: &str = r#"
    SELECT d.*, r.name AS recipient_name
    FROM distributions d
    JOIN recipients r ON r.id = d.recipient_id
"#;

#[derive(Clone)]
pub struct DistributionRepository {
    pool: PgPool,
}

impl DistributionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        recipient_id: Uuid,
        animal_id: Uuid,
        package_count: i32,
        distributed_on: NaiveDate,
    ) -> Result<Distribution, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let distribution = sqlx::query_as::<_, Distribution>(
            r#"
            INSERT INTO distributions (recipient_id, animal_id, package_count, distributed_on)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
            .bind(recipient_id)
            .bind(animal_id)
            .bind(package_count)
            .bind(distributed_on)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_constraint(e, "Recipient has already received a distribution"))?;
        Ok(distribution)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DistributionDetail>, AppError> {
        let query = format!("{} WHERE d.id = $1", DETAIL_SELECT);
        let detail = sqlx::query_as::<_, DistributionDetail>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(detail)
    }

    pub async fn find_by_recipient<'e, E>(&self, executor: E, recipient_id: Uuid) -> Result<Option<Distribution>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let distribution = sqlx::query_as::<_, Distribution>("SELECT * FROM distributions WHERE recipient_id = $1")
            .bind(recipient_id)
            .fetch_optional(executor)
            .await?;
        Ok(distribution)
    }

    pub async fn list(&self) -> Result<Vec<DistributionDetail>, AppError> {
        let query = format!("{} ORDER BY d.distributed_on, r.name", DETAIL_SELECT);
        let details = sqlx::query_as::<_, DistributionDetail>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(details)
    }

    pub async fn total_packages(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(package_count), 0)::BIGINT FROM distributions")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM distributions WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
