mod api;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use dealerdb_scraper::{ChromeEngine, Discovery, Geocoder, StepTimeouts};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = dealerdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = dealerdb_db::PoolConfig::from_app_config(&config);
    let pool = dealerdb_db::connect_pool(&config.database_url, pool_config).await?;
    dealerdb_db::run_migrations(&pool).await?;

    let engine = ChromeEngine::new(Duration::from_secs(config.step_timeout_secs));
    let geocoder = Geocoder::new(
        &config.geocoder_base_url,
        &config.user_agent,
        Duration::from_secs(config.geocode_timeout_secs),
    )?;
    let timeouts = StepTimeouts::new(
        Duration::from_secs(config.nav_timeout_secs),
        Duration::from_secs(config.step_timeout_secs),
    );
    let discovery = Arc::new(Discovery::new(engine, geocoder, timeouts));

    let app = build_app(AppState {
        pool: pool.clone(),
        catalog: dealerdb_db::PgDealerCatalog::new(pool),
        discovery,
    });

    tracing::info!(addr = %config.bind_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
