use std::net::SocketAddr;

use skyroute_core::{SkyrouteConfig, SkyrouteServices};
use skyroute_web::{create_router, AppState, SWEEP_INTERVAL};
use tokio::net::TcpListener;
use tracing::info;

use crate::error::CliError;

pub async fn run(config: &SkyrouteConfig, services: SkyrouteServices) -> Result<(), CliError> {
    let restored = services.warm_up().await;
    info!(restored, "route cache restored");

    let state = AppState::new(services);
    let sweeper = state.spawn_cache_sweeper(SWEEP_INTERVAL);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, upstream = %config.api_url, "skyroute listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweeper.abort();
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
