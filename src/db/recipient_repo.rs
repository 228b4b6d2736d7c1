// src/db/recipient_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::recipient::{Recipient, RecipientCategory},
};

#[derive(Clone)]
pub struct RecipientRepository {
    pool: PgPool,
}

impl RecipientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        address: Option<&str>,
        phone: Option<&str>,
        category: RecipientCategory,
        donor_id: Option<Uuid>,
    ) -> Result<Recipient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let recipient = sqlx::query_as::<_, Recipient>(
            r#"
            INSERT INTO recipients (name, address, phone, category, donor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(name)
            .bind(address)
            .bind(phone)
            .bind(category)
            .bind(donor_id)
            .fetch_one(executor)
            .await?;
        Ok(recipient)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Recipient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let recipient = sqlx::query_as::<_, Recipient>("SELECT * FROM recipients WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(recipient)
    }

    pub async fn list(&self) -> Result<Vec<Recipient>, AppError> {
        let recipients = sqlx::query_as::<_, Recipient>("SELECT * FROM recipients ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(recipients)
    }

    // Recipients that have not received a package yet
    pub async fn list_unserved(&self) -> Result<Vec<Recipient>, AppError> {
        let recipients = sqlx::query_as::<_, Recipient>(
            r#"
            SELECT r.*
            FROM recipients r
            WHERE NOT EXISTS (SELECT 1 FROM distributions d WHERE d.recipient_id = r.id)
            ORDER BY r.name
            "#,
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(recipients)
    }

    pub async fn update<'e, E>(&self, executor: E, recipient: &Recipient) -> Result<Recipient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Recipient>(
            r#"
            UPDATE recipients
            SET name = $2, address = $3, phone = $4, category = $5, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(recipient.id)
            .bind(&recipient.name)
            .bind(&recipient.address)
            .bind(&recipient.phone)
            .bind(recipient.category)
            .fetch_one(executor)
            .await?;
        Ok(updated)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM recipients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| AppError::from_constraint(e, "Recipient already has a distribution"))?;
        Ok(result.rows_affected())
    }
}
