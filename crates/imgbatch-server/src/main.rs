//! imgbatch Server - Main entry point

use anyhow::Result;
use imgbatch_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tracing::info;

use imgbatch_server::{
    api,
    config::{Config, StoreBackend},
    db,
    ingest::TinifyClient,
    store::{InMemoryProductStore, MySqlProductStore, ProductStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::default()
        .with_file_prefix("imgbatch-server")
        .with_filter_directives("imgbatch_server=debug,tower_http=debug,sqlx=warn")
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting imgbatch server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let (store, pool) = match config.database.backend {
        StoreBackend::MySql => {
            let pool = db::create_pool(&config.database).await?;
            (Arc::new(MySqlProductStore::new(pool.clone())) as Arc<dyn ProductStore>, Some(pool))
        },
        StoreBackend::Memory => {
            info!("Using in-memory product store; rows are lost on exit");
            (Arc::new(InMemoryProductStore::new()) as Arc<dyn ProductStore>, None)
        },
    };

    store.ensure_schema().await?;

    for dir in [&config.pipeline.upload_dir, &config.pipeline.image_dir] {
        tokio::fs::create_dir_all(dir).await?;
    }

    let http = reqwest::Client::builder()
        .user_agent(concat!("imgbatch-server/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let compressor = Arc::new(TinifyClient::new(http.clone(), &config.compression));

    let state = api::build_state(&config, store, compressor, http);
    let app = api::create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
        info!("Database connection pool closed");
    }

    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give in-flight batches time to finish their current row
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
