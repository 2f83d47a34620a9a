//! Peer Cache - a node of a distributed in-memory key/value cache
//!
//! Serves one group backed by a data directory and joins the peers listed
//! in `PEERS`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peer_cache::group::DirectoryGetter;
use peer_cache::peers::HttpPool;
use peer_cache::{create_router, new_group, AppState, Config};

/// Main entry point for the cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Build the peer pool and register the group
/// 4. Start HTTP server on configured port
/// 5. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peer_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate()?;
    info!(
        "Configuration loaded: self={}, group={}, cache_bytes={}, base_path={}, peers={:?}",
        config.self_addr, config.group_name, config.cache_bytes, config.base_path, config.peers
    );

    let pool = Arc::new(HttpPool::with_options(
        &config.self_addr,
        &config.base_path,
        config.ring_replicas,
        config.peer_timeout(),
    )?);
    pool.set_peers(&config.peers)?;

    let group = new_group(
        config.group_name.as_str(),
        config.cache_bytes,
        DirectoryGetter::new(&config.data_dir),
    );
    group.register_peers(pool)?;
    info!(
        "Group {} serving from {}",
        group.name(),
        config.data_dir.display()
    );

    let app = create_router(AppState::from_config(&config)?);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Cache node listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving requests")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
