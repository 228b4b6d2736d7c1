// src/db/slaughter_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::slaughter::SlaughterRecord};

#[derive(Clone)]
pub struct SlaughterRepository {
    pool: PgPool,
}

impl SlaughterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        animal_id: Uuid,
        scheduled_at: DateTime<Utc>,
        location: &str,
        planned_order: i32,
    ) -> Result<SlaughterRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, SlaughterRecord>(
            r#"
            INSERT INTO slaughter_records (animal_id, scheduled_at, location, planned_order)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
            .bind(animal_id)
            .bind(scheduled_at)
            .bind(location)
            .bind(planned_order)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_constraint(e, "Animal already has a slaughter record"))?;
        Ok(record)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SlaughterRecord>, AppError> {
        let record = sqlx::query_as::<_, SlaughterRecord>("SELECT * FROM slaughter_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    pub async fn find_by_animal<'e, E>(&self, executor: E, animal_id: Uuid) -> Result<Option<SlaughterRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, SlaughterRecord>("SELECT * FROM slaughter_records WHERE animal_id = $1")
            .bind(animal_id)
            .fetch_optional(executor)
            .await?;
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<SlaughterRecord>, AppError> {
        let records = sqlx::query_as::<_, SlaughterRecord>(
            "SELECT * FROM slaughter_records ORDER BY scheduled_at, planned_order",
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    pub async fn slaughtered_animal_ids(&self) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT animal_id FROM slaughter_records")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    pub async fn update<'e, E>(&self, executor: E, record: &SlaughterRecord) -> Result<SlaughterRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, SlaughterRecord>(
            r#"
            UPDATE slaughter_records
            SET scheduled_at = $2, location = $3, planned_order = $4, actual_order = $5,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(record.id)
            .bind(record.scheduled_at)
            .bind(&record.location)
            .bind(record.planned_order)
            .bind(record.actual_order)
            .fetch_one(executor)
            .await?;
        Ok(updated)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM slaughter_records WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
