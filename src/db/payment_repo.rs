// src/db/payment_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payment::{DonorSettlement, NewPayment, Payment, PaymentStatus},
};

// Statuses meaning money was received
const SETTLED: &str = "status IN ('settlement', 'capture')";

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, new: &NewPayment) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (
                order_id, transaction_id, donor_id, method, bank, payment_type,
                va_number, amount, status, fraud_status, approval_code, transaction_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
            .bind(&new.order_id)
            .bind(&new.transaction_id)
            .bind(new.donor_id)
            .bind(new.method.as_str())
            .bind(new.bank.map(|b| b.as_str()))
            .bind(&new.payment_type)
            .bind(&new.va_number)
            .bind(new.amount)
            .bind(new.status)
            .bind(&new.fraud_status)
            .bind(&new.approval_code)
            .bind(new.transaction_time)
            .fetch_one(executor)
            .await?;
        Ok(payment)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(payment)
    }

    pub async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(payment)
    }

    pub async fn find_by_order_id_for_update<'e, E>(
        &self,
        executor: E,
        order_id: &str,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    pub async fn list(&self) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>("SELECT * FROM payments ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(payments)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: PaymentStatus,
        transaction_id: Option<&str>,
        fraud_status: Option<&str>,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $2,
                transaction_id = COALESCE($3, transaction_id),
                fraud_status = COALESCE($4, fraud_status),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(status)
            .bind(transaction_id)
            .bind(fraud_status)
            .fetch_one(executor)
            .await?;
        Ok(payment)
    }

    /// Sum of settled payment amounts per donor, only donors with at least one.
    pub async fn settled_by_donor<'e, E>(&self, executor: E) -> Result<Vec<DonorSettlement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "SELECT donor_id, SUM(amount) AS settled_amount FROM payments WHERE {} GROUP BY donor_id",
            SETTLED
        );
        let rows = sqlx::query_as::<_, DonorSettlement>(&query)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }
}
