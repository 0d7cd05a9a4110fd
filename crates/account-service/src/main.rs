//! Service binary: loads configuration, opens the database pool, and
//! serves the account API until SIGINT or SIGTERM.

use account_service::config::Config;
use account_service::routes::{self, AppState};
use account_service::services::MediaClient;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Account service starting");

    let config = Config::from_env().map_err(|e| {
        error!("Configuration is incomplete: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        media_upload_url = %config.media_upload_url,
        bcrypt_cost = config.bcrypt_cost,
        access_token_ttl_secs = config.access_token_ttl_secs,
        refresh_token_ttl_secs = config.refresh_token_ttl_secs,
        "Configuration loaded"
    );

    // Recorder must exist before the first request records a metric
    let metrics_handle = routes::init_metrics_recorder()?;

    info!("Opening database pool");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Database connection failed: {}", e);
            e
        })?;
    info!("Database pool ready");

    let media = MediaClient::new(config.media_upload_url.clone()).map_err(|e| {
        error!("Media client construction failed: {}", e);
        e
    })?;

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState {
        pool,
        config,
        media,
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Bind address does not parse: {}", e);
        e
    })?;

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Account service stopped");

    Ok(())
}

/// Resolve when the process should stop serving.
///
/// After SIGINT or SIGTERM, the listener stays open for a drain window
/// (ACCOUNT_DRAIN_SECONDS, default 30) so in-flight requests finish and
/// load balancers see the pod leave rotation before the socket closes.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Could not install the SIGINT handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("SIGINT received, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("SIGTERM received, shutting down");
            }
            Err(e) => {
                error!("Could not install the SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }

    let drain_secs = std::env::var("ACCOUNT_DRAIN_SECONDS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(30);

    if drain_secs > 0 {
        warn!(
            "Keeping the listener open {}s for in-flight requests",
            drain_secs
        );
        tokio::time::sleep(Duration::from_secs(drain_secs)).await;
        info!("Drain window elapsed");
    }
}
