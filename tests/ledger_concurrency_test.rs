// tests/ledger_concurrency_test.rs
//
// Needs a disposable Postgres database:
//   DATABASE_URL=postgres://... cargo test --test ledger_concurrency_test -- --ignored

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use kurban_backend::{
    common::error::AppError,
    config::{AppConfig, AppState},
    gateway::{ChargeRequest, ChargeResponse, GatewayError, PaymentGateway},
    models::{
        animal::{AnimalKind, CreateAnimalPayload},
        auth::{Role, User},
        donor::CreateDonorPayload,
        payment::{CreatePaymentPayload, PaidAttribution, PaymentMethod, PaymentStatus},
        share::{CreateSharePayload, UpdateSharePayload},
        slaughter::CreateSlaughterPayload,
    },
};

struct OfflineGateway;

#[async_trait]
impl PaymentGateway for OfflineGateway {
    async fn charge(&self, _request: &ChargeRequest) -> Result<ChargeResponse, GatewayError> {
        Err(GatewayError::Rejected("offline".into()))
    }

    fn verify_notification(&self, _: &str, _: &str, _: &str, _: &str) -> bool {
        false
    }
}

/// Accepts every charge as already settled.
struct SettlingGateway;

#[async_trait]
impl PaymentGateway for SettlingGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, GatewayError> {
        Ok(ChargeResponse {
            transaction_id: format!("txn-{}", request.order_id),
            status: PaymentStatus::Settlement,
            payment_type: Some("qris".into()),
            va_numbers: Vec::new(),
            qr_redirect_url: None,
            fraud_status: Some("accept".into()),
            approval_code: None,
            transaction_time: Some(Utc::now()),
        })
    }

    fn verify_notification(&self, _: &str, _: &str, _: &str, _: &str) -> bool {
        false
    }
}

fn admin() -> User {
    User {
        id: Uuid::new_v4(),
        username: "admin".into(),
        name: "Administrator".into(),
        email: "admin@example.com".into(),
        password_hash: String::new(),
        role: Role::Admin,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

async fn app_state() -> AppState {
    app_state_with(Arc::new(OfflineGateway)).await
}

async fn app_state_with(gateway: Arc<dyn PaymentGateway>) -> AppState {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(16)
        .connect(&database_url)
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    let config = AppConfig {
        database_url,
        jwt_secret: "test-secret".into(),
        midtrans_server_key: "test-key".into(),
        midtrans_base_url: "http://localhost".into(),
        gateway_timeout: Duration::from_secs(1),
        db_max_connections: 16,
        bind_addr: "127.0.0.1:0".into(),
        paid_attribution: PaidAttribution::Ledger,
        admin_seed: None,
    };
    AppState::with_gateway(pool, config, gateway)
}

async fn sapi(state: &AppState, price: i64) -> Uuid {
    state
        .animal_service
        .create_animal(CreateAnimalPayload {
            kind: AnimalKind::Sapi,
            weight: Decimal::new(350, 0),
            price: Some(Decimal::new(price, 0)),
            is_private: false,
            registered_on: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        })
        .await
        .unwrap()
        .animal
        .id
}

/// A donor with full billing contact.
async fn billable_donor(state: &AppState, actor: &User, label: &str) -> Uuid {
    let tag = Uuid::new_v4().simple().to_string();
    state
        .donor_service
        .create_donor(
            actor,
            CreateDonorPayload {
                user_id: None,
                name: Some(format!("{} {}", label, &tag[..6])),
                phone: format!("0812{}", &tag[..8]),
                email: Some(format!("{}@example.com", tag)),
                address: "Jl. Masjid 3".into(),
            },
        )
        .await
        .unwrap()
        .id
}

async fn hold(state: &AppState, actor: &User, donor_id: Uuid, animal_id: Uuid, headcount: i16) {
    state
        .share_service
        .create_share(
            actor,
            CreateSharePayload {
                donor_id,
                animal_id,
                headcount: Some(headcount),
            },
        )
        .await
        .unwrap();
}

fn slaughter_for(animal_id: Uuid) -> CreateSlaughterPayload {
    CreateSlaughterPayload {
        animal_id,
        scheduled_at: Utc::now(),
        location: "Halaman masjid".into(),
        planned_order: Some(1),
    }
}

async fn payments_of(state: &AppState, donor_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE donor_id = $1")
        .bind(donor_id)
        .fetch_one(&state.db_pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore]
async fn rejected_charge_leaves_no_payment_row() {
    let state = app_state().await;
    let actor = admin();
    let animal_id = sapi(&state, 21_000_000).await;
    let donor_id = billable_donor(&state, &actor, "Rejected").await;
    hold(&state, &actor, donor_id, animal_id, 1).await;

    let result = state
        .payment_service
        .create_payment(
            &actor,
            CreatePaymentPayload {
                donor_id,
                method: PaymentMethod::Qris,
                bank: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::UpstreamFailure(_))));
    assert_eq!(payments_of(&state, donor_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn unpaid_sapi_cannot_be_slaughtered() {
    let state = app_state().await;
    let actor = admin();
    let animal_id = sapi(&state, 21_000_000).await;
    let donor_id = billable_donor(&state, &actor, "Unpaid").await;
    hold(&state, &actor, donor_id, animal_id, 7).await;

    let result = state.slaughter_service.create_record(slaughter_for(animal_id)).await;

    assert!(matches!(result, Err(AppError::NotFullyPaid(id)) if id == animal_id));
}

#[tokio::test]
#[ignore]
async fn share_grown_after_settlement_blocks_slaughter() {
    let state = app_state_with(Arc::new(SettlingGateway)).await;
    let actor = admin();
    let animal_id = sapi(&state, 7_000_000).await;
    let donor_id = billable_donor(&state, &actor, "Grower").await;
    hold(&state, &actor, donor_id, animal_id, 1).await;

    let paid = state
        .payment_service
        .create_payment(
            &actor,
            CreatePaymentPayload {
                donor_id,
                method: PaymentMethod::Qris,
                bank: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(paid.payment.amount, Decimal::new(1_000_000, 0));

    state
        .share_service
        .update_share(&actor, donor_id, animal_id, UpdateSharePayload { headcount: Some(7) })
        .await
        .unwrap();

    let result = state.slaughter_service.create_record(slaughter_for(animal_id)).await;
    assert!(matches!(result, Err(AppError::NotFullyPaid(_))));
}

#[tokio::test]
#[ignore]
async fn concurrent_share_growth_keeps_animal_within_capacity() {
    let state = app_state().await;
    let actor = admin();
    let animal_id = sapi(&state, 21_000_000).await;
    let first = billable_donor(&state, &actor, "First").await;
    let second = billable_donor(&state, &actor, "Second").await;
    hold(&state, &actor, first, animal_id, 3).await;
    hold(&state, &actor, second, animal_id, 3).await;

    // Both raise 3/7 to 4/7; only one of them fits.
    let handles: Vec<_> = [first, second]
        .into_iter()
        .map(|donor_id| {
            let service = state.share_service.clone();
            let actor = actor.clone();
            tokio::spawn(async move {
                service
                    .update_share(&actor, donor_id, animal_id, UpdateSharePayload { headcount: Some(4) })
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(AppError::CapacityExceeded(_)) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(accepted, 1);

    let shares = state.share_service.list_by_animal(animal_id).await.unwrap();
    let total_sevenths: i64 = shares.iter().map(|s| i64::from(s.headcount)).sum();
    assert_eq!(total_sevenths, 7);
}

#[tokio::test]
#[ignore]
async fn concurrent_shares_never_exceed_one_animal() {
    let state = app_state().await;
    let actor = admin();

    let animal_id = state
        .animal_service
        .create_animal(CreateAnimalPayload {
            kind: AnimalKind::Sapi,
            weight: Decimal::new(350, 0),
            price: Some(Decimal::new(21_000_000, 0)),
            is_private: false,
            registered_on: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        })
        .await
        .unwrap()
        .animal
        .id;

    let mut donor_ids = Vec::new();
    for i in 0..10 {
        let donor = state
            .donor_service
            .create_donor(
                &actor,
                CreateDonorPayload {
                    user_id: None,
                    name: Some(format!("Donor {}", i)),
                    phone: format!("08120000{:04}", i),
                    email: None,
                    address: "Jl. Masjid 1".into(),
                },
            )
            .await
            .unwrap();
        donor_ids.push(donor.id);
    }

    // Ten donors race for two sevenths each; at most three can fit.
    let mut handles = Vec::new();
    for donor_id in donor_ids {
        let service = state.share_service.clone();
        let actor = actor.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_share(
                    &actor,
                    CreateSharePayload {
                        donor_id,
                        animal_id,
                        headcount: Some(2),
                    },
                )
                .await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(AppError::CapacityExceeded(_)) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(accepted, 3);

    let shares = state.share_service.list_by_animal(animal_id).await.unwrap();
    let total_sevenths: i64 = shares.iter().map(|s| i64::from(s.headcount)).sum();
    assert!(total_sevenths <= 7);
    assert_eq!(total_sevenths, 6);
}

#[tokio::test]
#[ignore]
async fn goat_accepts_a_single_owner_under_contention() {
    let state = app_state().await;
    let actor = admin();

    let animal_id = state
        .animal_service
        .create_animal(CreateAnimalPayload {
            kind: AnimalKind::Kambing,
            weight: Decimal::new(30, 0),
            price: Some(Decimal::new(3_000_000, 0)),
            is_private: false,
            registered_on: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        })
        .await
        .unwrap()
        .animal
        .id;

    let mut handles = Vec::new();
    for i in 0..5 {
        let donor = state
            .donor_service
            .create_donor(
                &actor,
                CreateDonorPayload {
                    user_id: None,
                    name: Some(format!("Goat donor {}", i)),
                    phone: format!("08130000{:04}", i),
                    email: None,
                    address: "Jl. Masjid 2".into(),
                },
            )
            .await
            .unwrap();
        let service = state.share_service.clone();
        let actor = actor.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_share(
                    &actor,
                    CreateSharePayload {
                        donor_id: donor.id,
                        animal_id,
                        headcount: None,
                    },
                )
                .await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
}
