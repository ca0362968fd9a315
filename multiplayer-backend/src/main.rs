use std::sync::Arc;

use anyhow::Context;
use multiplayer_backend::config::Config;
use multiplayer_backend::{ModeAccess, MultiplayerService, create_http_app, create_rpc_app};
use multiplayer_db::{Database, MemoryCache};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    let default_level = "debug";
    #[cfg(not(debug_assertions))]
    let default_level = "info";

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting multiplayer service...");

    let config = Config::from_env();
    tracing::info!(
        "Configuration: http_port={}, rpc_port={}, db_path={}, cache_ttl={}s, body_limit={}KB, timeout={}s",
        config.http_port,
        config.rpc_port,
        config.database_path,
        config.cache_ttl.as_secs(),
        config.request_body_limit / 1024,
        config.request_timeout.as_secs(),
    );

    let db = Database::open(&config.database_path)
        .await
        .with_context(|| format!("failed to open database at {}", config.database_path))?;

    let cache = Arc::new(MemoryCache::new());
    let sweeper = cache.clone();
    let sweep_interval = config.cache_sweep_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            sweeper.purge_expired().await;
        }
    });

    let access = ModeAccess::new(Arc::new(db), cache, config.cache_ttl);
    let service = MultiplayerService::new(access);
    let limits = config.transport_limits();

    let rpc_addr = format!("0.0.0.0:{}", config.rpc_port);
    let rpc_listener = TcpListener::bind(&rpc_addr)
        .await
        .with_context(|| format!("failed to bind {rpc_addr}"))?;
    tracing::info!("RPC server listening on {}", rpc_addr);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let http_listener = TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("failed to bind {http_addr}"))?;
    tracing::info!("HTTP server listening on {}", http_addr);

    let rpc_app = create_rpc_app(service.clone(), limits);
    let http_app = create_http_app(service, limits);

    tokio::select! {
        result = axum::serve(rpc_listener, rpc_app) => {
            if let Err(e) = result {
                tracing::error!("RPC server error: {}", e);
            }
        }
        result = axum::serve(http_listener, http_app) => {
            if let Err(e) = result {
                tracing::error!("HTTP server error: {}", e);
            }
        }
    }

    Ok(())
}
