// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use kurban_backend::{
    config::{AppConfig, AppState},
    docs::ApiDoc,
    handlers,
    middleware::auth::auth_guard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let admin_seed = config.admin_seed.clone();

    let app_state = AppState::new(config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Database migrations applied");

    if let Some(seed) = admin_seed {
        app_state
            .auth_service
            .seed_admin(&seed.email, &seed.password)
            .await?;
    }

    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/", get(handlers::auth::list_users))
        .route("/me", get(handlers::auth::get_me))
        .route("/{id}/role", patch(handlers::auth::update_role))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let animal_routes = Router::new()
        .route("/"
               ,post(handlers::animals::create_animal)
               .get(handlers::animals::list_animals)
        )
        .route("/{id}"
               ,get(handlers::animals::get_animal)
               .put(handlers::animals::update_animal)
               .delete(handlers::animals::delete_animal)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let donor_routes = Router::new()
        .route("/"
               ,post(handlers::donors::create_donor)
               .get(handlers::donors::list_donors)
        )
        .route("/me", get(handlers::donors::get_my_donor))
        .route("/{id}"
               ,get(handlers::donors::get_donor)
               .put(handlers::donors::update_donor)
               .delete(handlers::donors::delete_donor)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let share_routes = Router::new()
        .route("/"
               ,post(handlers::shares::create_share)
               .get(handlers::shares::list_shares)
        )
        .route("/hewan/{id}", get(handlers::shares::list_by_animal))
        .route("/pekurban/{id}", get(handlers::shares::list_by_donor))
        .route("/{donor_id}/{animal_id}"
               ,put(handlers::shares::update_share)
               .delete(handlers::shares::delete_share)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let payment_routes = Router::new()
        .route("/"
               ,post(handlers::payments::create_payment)
               .get(handlers::payments::list_payments)
        )
        .route("/rekap/hewan", get(handlers::payments::funding_per_animal))
        .route("/rekap/pekurban", get(handlers::payments::donor_progress))
        .route("/order/{order_id}", get(handlers::payments::get_by_order_id))
        .route("/{id}", get(handlers::payments::get_payment))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // The gateway authenticates with the notification signature, not a JWT
    let notification_routes = Router::new()
        .route("/notifikasi", post(handlers::payments::payment_notification));

    let slaughter_routes = Router::new()
        .route("/"
               ,post(handlers::slaughter::create_record)
               .get(handlers::slaughter::list_records)
        )
        .route("/{id}"
               ,get(handlers::slaughter::get_record)
               .put(handlers::slaughter::update_record)
               .delete(handlers::slaughter::delete_record)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let recipient_routes = Router::new()
        .route("/"
               ,post(handlers::recipients::create_recipient)
               .get(handlers::recipients::list_recipients)
        )
        .route("/{id}"
               ,get(handlers::recipients::get_recipient)
               .put(handlers::recipients::update_recipient)
               .delete(handlers::recipients::delete_recipient)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let distribution_routes = Router::new()
        .route("/"
               ,post(handlers::distributions::create_distribution)
               .get(handlers::distributions::list_distributions)
        )
        .route("/total-paket", get(handlers::distributions::total_packages))
        .route("/belum-terdistribusi", get(handlers::distributions::unserved_recipients))
        .route("/{id}"
               ,get(handlers::distributions::get_distribution)
               .delete(handlers::distributions::delete_distribution)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/hewan-kurban", animal_routes)
        .nest("/api/pekurban", donor_routes)
        .nest("/api/patungan", share_routes)
        .nest("/api/pembayaran", notification_routes.merge(payment_routes))
        .nest("/api/penyembelihan", slaughter_routes)
        .nest("/api/penerima", recipient_routes)
        .nest("/api/distribusi", distribution_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
