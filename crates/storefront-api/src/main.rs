//! Storefront API server entry point.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use storefront_bridge::{
    Argon2PasswordHasher, ConsoleMailSender, JwtTokenSigner, StripePaymentGateway,
};
use storefront_core::clock::{Clock, SystemClock};
use storefront_core::id::{IdGenerator, RandomIdGenerator};
use storefront_enduser::application::services::EnduserServices;
use storefront_enduser::application::wiring::{SubscriberDependencies, build_publisher};
use storefront_enduser::domain::adapters::TokenSigner;
use storefront_enduser::domain::subscribers::VerificationMailSettings;
use storefront_store::postgres::PgTransactionManager;
use storefront_store::redis_session_store::RedisSessionStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use storefront_api::config::Config;
use storefront_api::cookies::CookieSettings;
use storefront_api::error::AppError;
use storefront_api::state::AppState;
use storefront_api::{build_router, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    let tracer_provider = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!(?config, "Starting storefront API server");

    let result = run(config).await;
    telemetry::shutdown(tracer_provider);
    result.map_err(Into::into)
}

async fn run(config: Config) -> Result<(), AppError> {
    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    storefront_store::MIGRATOR.run(&pool).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ids: Arc<dyn IdGenerator> = Arc::new(RandomIdGenerator);
    let session_store =
        Arc::new(RedisSessionStore::connect(&config.redis_url, clock.clone()).await?);
    let token_signer: Arc<dyn TokenSigner> =
        Arc::new(JwtTokenSigner::new(config.jwt_secret_key.as_bytes()));

    let publisher = build_publisher(SubscriberDependencies {
        mail_sender: Arc::new(ConsoleMailSender::new()),
        payment_gateway: Arc::new(StripePaymentGateway::new(
            config.stripe_api_base.clone(),
            config.stripe_secret_key.clone(),
        )),
        token_signer: token_signer.clone(),
        session_carts: session_store.clone(),
        ids: ids.clone(),
        verification: VerificationMailSettings {
            from: config.mail_from.clone(),
            backend_url: config.backend_url.clone(),
        },
    });
    tracing::debug!(?publisher, "subscribers registered");

    let services = EnduserServices {
        transactions: Arc::new(PgTransactionManager::new(pool)),
        session_accounts: session_store.clone(),
        session_carts: session_store,
        publisher: Arc::new(publisher),
        token_signer,
        password_hasher: Arc::new(Argon2PasswordHasher::new()),
        clock,
        ids,
    };
    let state = AppState::new(
        services,
        CookieSettings {
            domain: config.cookie_domain.clone(),
        },
    );

    // TODO: Replace CorsLayer::permissive() with the storefront origin once the
    // frontend URL is configurable.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.listen_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
