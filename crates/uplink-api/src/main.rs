use std::sync::Arc;

use uplink_api::routes::setup_routes;
use uplink_api::state::AppState;
use uplink_api::telemetry;
use uplink_core::Config;
use uplink_host::RemoteHost;
use uplink_store::RedisStore;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    telemetry::init_telemetry();

    let config = Config::from_env()?;

    let store = Arc::new(RedisStore::connect(config.redis_url()).await?);
    let host = Arc::new(RemoteHost::new(&config)?);
    let state = Arc::new(AppState::new(config.clone(), store, host));

    // The periodic sweep is optional; deployments with an external scheduler
    // hit the sweep endpoint instead.
    let _sweep_handle = if config.sweep_enabled() {
        tracing::info!(
            interval_secs = config.sweep_interval().as_secs(),
            stale_minutes = config.sweep_stale_minutes(),
            limit = config.sweep_batch_limit(),
            "Starting background sweeper"
        );
        Some(state.sweeper.clone().start(
            config.sweep_interval(),
            config.sweep_stale_minutes(),
            config.sweep_batch_limit(),
        ))
    } else {
        None
    };

    let app = setup_routes(&config, state)?;

    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Listens for Ctrl+C (SIGINT) and SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
