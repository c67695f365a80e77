use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use domain::services::TokenVerifier;
use persistence::db::{create_pool, run_migrations, PoolSettings};
use persistence::repositories::{ContentRepository, LetterRequestRepository};
use village_portal_api::app::{router, AppDependencies, AppState};
use village_portal_api::config::{Config, IdentityConfig, IdentityProvider};
use village_portal_api::jobs::{JobScheduler, PoolMetricsJob, PruneRateLimiterJob};
use village_portal_api::middleware::{init_metrics, logging::init_logging};
use village_portal_api::services::{
    build_notifier, FirebaseTokenVerifier, RecaptchaVerifier, StaticKeyVerifier,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("loading configuration")?;
    init_logging(&config.logging);
    init_metrics().context("installing metrics recorder")?;

    info!("Starting village portal API v{}", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(&PoolSettings::from(&config.database)).await?;
    run_migrations(&pool).await?;

    let deps = AppDependencies {
        letter_store: Arc::new(LetterRequestRepository::new(pool.clone())),
        content_store: Arc::new(ContentRepository::new(pool.clone())),
        token_verifier: token_verifier(&config.identity)?,
        captcha: Arc::new(RecaptchaVerifier::new(config.recaptcha.clone())?),
        notifier: build_notifier(&config.notification)?,
    };

    let addr = config.socket_addr()?;
    let state = AppState::new(config, deps);

    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool));
    if let Some(limiter) = state.rate_limiter.clone() {
        scheduler.register(PruneRateLimiterJob::new(limiter));
    }
    scheduler.start();

    let app = router(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.shutdown(Duration::from_secs(5)).await;
    info!("Server stopped");
    Ok(())
}

fn token_verifier(config: &IdentityConfig) -> Result<Arc<dyn TokenVerifier>> {
    Ok(match config.provider {
        IdentityProvider::Firebase => Arc::new(FirebaseTokenVerifier::new(
            config.project_id.clone(),
            config.jwks_url.clone(),
            config.leeway_secs,
        )?),
        IdentityProvider::Static => Arc::new(
            StaticKeyVerifier::from_pem(
                &config.public_key,
                &config.project_id,
                &config.issuer,
                config.leeway_secs,
            )
            .context("parsing identity.public_key")?,
        ),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
