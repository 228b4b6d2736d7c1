// src/services/payment_service.rs

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AnimalRepository, DonorRepository, PaymentRepository, ShareRepository},
    gateway::{ChargeRequest, CustomerDetails, PaymentGateway},
    models::{
        auth::User,
        payment::{
            generate_order_id, AnimalFunding, CreatePaymentPayload, DonorProgress, NewPayment,
            NotificationEffect, PaidAttribution, Payment, PaymentNotification, PaymentResponse, PaymentStatus,
        },
    },
    services::{policy, reconciliation},
};

#[derive(Clone)]
pub struct PaymentService {
    pool: PgPool,
    payment_repo: PaymentRepository,
    donor_repo: DonorRepository,
    share_repo: ShareRepository,
    animal_repo: AnimalRepository,
    gateway: Arc<dyn PaymentGateway>,
    attribution: PaidAttribution,
}

impl PaymentService {
    pub fn new(
        pool: PgPool,
        payment_repo: PaymentRepository,
        donor_repo: DonorRepository,
        share_repo: ShareRepository,
        animal_repo: AnimalRepository,
        gateway: Arc<dyn PaymentGateway>,
        attribution: PaidAttribution,
    ) -> Self {
        Self {
            pool,
            payment_repo,
            donor_repo,
            share_repo,
            animal_repo,
            gateway,
            attribution,
        }
    }

    /// Charges a donor for everything it owns. The donor row stays locked
    /// for the whole call and the payment row is written only after the
    /// gateway accepted the charge; any failure leaves nothing behind.
    /// The pooled connection is held across the gateway call, bounded by
    /// the gateway timeout.
    pub async fn create_payment(&self, actor: &User, payload: CreatePaymentPayload) -> Result<PaymentResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let donor = self.donor_repo
            .find_by_id_for_update(&mut *tx, payload.donor_id)
            .await?
            .ok_or_else(|| AppError::not_found("Donor"))?;
        policy::ensure_can_act_for_donor(actor, &donor)?;

        let (name, email, phone) = donor.billing_contact().ok_or_else(|| {
            AppError::Validation("Donor name, e-mail and phone are required for payment".into())
        })?;

        let holdings = self.share_repo.holdings_for_donor(&mut *tx, donor.id).await?;
        let amount = reconciliation::charge_amount(&holdings)?;

        let order_id = generate_order_id(Utc::now());
        let request = ChargeRequest {
            order_id: order_id.clone(),
            amount,
            method: payload.method,
            bank: payload.bank,
            customer: CustomerDetails {
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
            },
        };

        let charge = self.gateway.charge(&request).await.map_err(|e| {
            tracing::warn!(order_id = %order_id, donor_id = %donor.id, error = %e, "Charge rejected");
            e
        })?;

        let new = NewPayment {
            order_id: order_id.clone(),
            transaction_id: charge.transaction_id.clone(),
            donor_id: donor.id,
            method: payload.method,
            bank: payload.bank,
            payment_type: charge.payment_type.clone(),
            va_number: charge.va_numbers.first().map(|v| v.va_number.clone()),
            amount,
            status: charge.status,
            fraud_status: charge.fraud_status.clone(),
            approval_code: charge.approval_code.clone(),
            transaction_time: charge.transaction_time,
        };

        let persisted = async move {
            let payment = self.payment_repo.insert(&mut *tx, &new).await?;
            tx.commit().await?;
            Ok::<_, AppError>(payment)
        }
            .await;

        let payment = persisted.map_err(|e| {
            tracing::error!(
                order_id = %order_id,
                transaction_id = %charge.transaction_id,
                error = %e,
                "Gateway accepted the charge but the payment could not be recorded"
            );
            e
        })?;

        tracing::info!(
            order_id = %payment.order_id,
            donor_id = %payment.donor_id,
            amount = %payment.amount,
            status = %payment.status,
            "✅ Payment created"
        );

        Ok(PaymentResponse {
            payment,
            redirect_url: charge.qr_redirect_url,
        })
    }

    /// Applies an asynchronous gateway status callback. A transition that is
    /// not allowed leaves the payment untouched; a repeated status still
    /// records new transaction or fraud metadata.
    pub async fn handle_notification(&self, notification: PaymentNotification) -> Result<Payment, AppError> {
        let verified = self.gateway.verify_notification(
            &notification.order_id,
            &notification.status_code,
            &notification.gross_amount,
            &notification.signature_key,
        );
        if !verified {
            tracing::warn!(order_id = %notification.order_id, "Notification with invalid signature");
            return Err(AppError::Forbidden("Invalid notification signature".into()));
        }

        let next: PaymentStatus = notification.transaction_status.parse().map_err(|_| {
            AppError::Validation(format!(
                "Unknown transaction status '{}'",
                notification.transaction_status
            ))
        })?;

        let mut tx = self.pool.begin().await?;

        let payment = self.payment_repo
            .find_by_order_id_for_update(&mut *tx, &notification.order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Payment"))?;

        match payment.notification_effect(
            next,
            notification.transaction_id.as_deref(),
            notification.fraud_status.as_deref(),
        ) {
            // Nothing written; dropping the transaction releases the row lock
            NotificationEffect::Unchanged => return Ok(payment),
            NotificationEffect::Disallowed => {
                tracing::warn!(
                    order_id = %payment.order_id,
                    from = %payment.status,
                    to = %next,
                    "Ignoring disallowed payment status transition"
                );
                return Ok(payment);
            }
            NotificationEffect::Transition | NotificationEffect::Refresh => {}
        }

        let updated = self.payment_repo
            .update_status(
                &mut *tx,
                payment.id,
                next,
                notification.transaction_id.as_deref(),
                notification.fraud_status.as_deref(),
            )
            .await?;
        tx.commit().await?;

        tracing::info!(
            order_id = %updated.order_id,
            from = %payment.status,
            to = %updated.status,
            "Payment updated from notification"
        );
        Ok(updated)
    }

    pub async fn get_payment(&self, id: Uuid) -> Result<PaymentResponse, AppError> {
        let payment = self.payment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Payment"))?;
        Ok(PaymentResponse { payment, redirect_url: None })
    }

    pub async fn get_by_order_id(&self, order_id: &str) -> Result<PaymentResponse, AppError> {
        let payment = self.payment_repo
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Payment"))?;
        Ok(PaymentResponse { payment, redirect_url: None })
    }

    pub async fn list_payments(&self) -> Result<Vec<PaymentResponse>, AppError> {
        let payments = self.payment_repo.list().await?;
        Ok(payments
            .into_iter()
            .map(|payment| PaymentResponse { payment, redirect_url: None })
            .collect())
    }

    // =========================================================================
    //  RECONCILIATION VIEWS
    //  Inputs are read in one repeatable-read snapshot so the ledger and the
    //  payment rows agree with each other.
    // =========================================================================

    pub async fn funding_per_animal(&self) -> Result<Vec<AnimalFunding>, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let animals = self.animal_repo.list(&mut *tx).await?;
        let holdings = self.share_repo.all_holdings(&mut *tx).await?;
        let settlements = self.payment_repo.settled_by_donor(&mut *tx).await?;
        tx.commit().await?;

        Ok(reconciliation::animal_funding(&animals, &holdings, &settlements))
    }

    pub async fn donor_progress(&self) -> Result<Vec<DonorProgress>, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let donors = self.donor_repo.list(&mut *tx).await?;
        let holdings = self.share_repo.all_holdings(&mut *tx).await?;
        let settlements = self.payment_repo.settled_by_donor(&mut *tx).await?;
        tx.commit().await?;

        Ok(reconciliation::donor_progress(&donors, &holdings, &settlements, self.attribution))
    }
}
