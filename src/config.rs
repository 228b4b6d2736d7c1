// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AnimalRepository, DistributionRepository, DonorRepository, PaymentRepository,
        RecipientRepository, ShareRepository, SlaughterRepository, UserRepository,
    },
    gateway::{MidtransClient, PaymentGateway},
    models::payment::PaidAttribution,
    services::{
        animal_service::AnimalService, auth::AuthService, distribution_service::DistributionService,
        donor_service::DonorService, payment_service::PaymentService,
        recipient_service::RecipientService, share_service::ShareService,
        slaughter_service::SlaughterService,
    },
};

const DEFAULT_MIDTRANS_BASE_URL: &str = "https://api.sandbox.midtrans.com";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub midtrans_server_key: String,
    pub midtrans_base_url: String,
    pub gateway_timeout: Duration,
    /// Each in-flight charge holds one connection (and its donor lock) for
    /// up to `gateway_timeout`, so size this above the expected number of
    /// concurrent payments.
    pub db_max_connections: u32,
    pub bind_addr: String,
    pub paid_attribution: PaidAttribution,
    pub admin_seed: Option<AdminSeed>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| {
            get(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{} must be set", key))
        };

        let gateway_timeout_secs: u64 = get("GATEWAY_TIMEOUT_SECS")
            .map(|v| v.parse())
            .transpose()
            .context("GATEWAY_TIMEOUT_SECS must be a number of seconds")?
            .unwrap_or(15);

        let db_max_connections: u32 = get("DB_MAX_CONNECTIONS")
            .map(|v| v.parse())
            .transpose()
            .context("DB_MAX_CONNECTIONS must be a positive integer")?
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);

        let paid_attribution = get("PAID_ATTRIBUTION")
            .map(|v| v.parse::<PaidAttribution>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid PAID_ATTRIBUTION: {}", e))?
            .unwrap_or_default();

        let admin_seed = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminSeed { email, password })
            }
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            midtrans_server_key: required("MIDTRANS_SERVER_KEY")?,
            midtrans_base_url: get("MIDTRANS_BASE_URL").unwrap_or_else(|| DEFAULT_MIDTRANS_BASE_URL.to_string()),
            gateway_timeout: Duration::from_secs(gateway_timeout_secs),
            db_max_connections,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            paid_attribution,
            admin_seed,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub animal_service: AnimalService,
    pub donor_service: DonorService,
    pub share_service: ShareService,
    pub payment_service: PaymentService,
    pub slaughter_service: SlaughterService,
    pub recipient_service: RecipientService,
    pub distribution_service: DistributionService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("failed to connect to the database")?;

        tracing::info!("✅ Database connection established");

        let gateway = MidtransClient::new(
            config.midtrans_server_key.clone(),
            config.midtrans_base_url.clone(),
            config.gateway_timeout,
        )
            .context("failed to build the payment gateway client")?;

        Ok(Self::with_gateway(db_pool, config, Arc::new(gateway)))
    }

    /// Wires repositories and services around an existing pool and gateway.
    pub fn with_gateway(db_pool: PgPool, config: AppConfig, gateway: Arc<dyn PaymentGateway>) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let animal_repo = AnimalRepository::new();
        let donor_repo = DonorRepository::new();
        let share_repo = ShareRepository::new(db_pool.clone());
        let payment_repo = PaymentRepository::new(db_pool.clone());
        let slaughter_repo = SlaughterRepository::new(db_pool.clone());
        let recipient_repo = RecipientRepository::new(db_pool.clone());
        let distribution_repo = DistributionRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let animal_service = AnimalService::new(
            db_pool.clone(),
            animal_repo.clone(),
            share_repo.clone(),
            slaughter_repo.clone(),
        );
        let donor_service = DonorService::new(db_pool.clone(), donor_repo.clone(), user_repo);
        let share_service = ShareService::new(
            db_pool.clone(),
            share_repo.clone(),
            animal_repo.clone(),
            donor_repo.clone(),
        );
        let payment_service = PaymentService::new(
            db_pool.clone(),
            payment_repo.clone(),
            donor_repo.clone(),
            share_repo.clone(),
            animal_repo.clone(),
            gateway,
            config.paid_attribution,
        );
        let slaughter_service = SlaughterService::new(
            db_pool.clone(),
            slaughter_repo.clone(),
            animal_repo.clone(),
            share_repo,
            payment_repo,
        );
        let recipient_service = RecipientService::new(
            db_pool.clone(),
            recipient_repo.clone(),
            donor_repo,
            distribution_repo.clone(),
        );
        let distribution_service = DistributionService::new(
            db_pool.clone(),
            distribution_repo,
            recipient_repo,
            animal_repo,
            slaughter_repo,
        );

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            animal_service,
            donor_service,
            share_service,
            payment_service,
            slaughter_service,
            recipient_service,
            distribution_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/kurban"),
        ("JWT_SECRET", "secret"),
        ("MIDTRANS_SERVER_KEY", "SB-Mid-server-xxx"),
    ];

    #[test]
    fn defaults_are_applied() {
        let config = AppConfig::from_lookup(lookup(&BASE)).unwrap();
        assert_eq!(config.midtrans_base_url, DEFAULT_MIDTRANS_BASE_URL);
        assert_eq!(config.gateway_timeout, Duration::from_secs(15));
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.paid_attribution, PaidAttribution::Ledger);
        assert!(config.admin_seed.is_none());
    }

    #[test]
    fn missing_required_value_fails() {
        let err = AppConfig::from_lookup(lookup(&BASE[..2])).unwrap_err();
        assert!(err.to_string().contains("MIDTRANS_SERVER_KEY"));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("PAID_ATTRIBUTION", "direct"),
            ("GATEWAY_TIMEOUT_SECS", "5"),
            ("ADMIN_EMAIL", "admin@masjid.id"),
            ("ADMIN_PASSWORD", "rahasia123"),
        ]);
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.paid_attribution, PaidAttribution::Direct);
        assert_eq!(config.gateway_timeout, Duration::from_secs(5));
        assert_eq!(config.admin_seed.unwrap().email, "admin@masjid.id");
    }

    #[test]
    fn invalid_attribution_fails() {
        let mut pairs = BASE.to_vec();
        pairs.push(("PAID_ATTRIBUTION", "both"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
    }
}
