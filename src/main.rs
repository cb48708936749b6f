use std::sync::Arc;

use coopsweeper::{
    build_app, room::start_cleanup_task, AppState, ConnectionRouter, InMemoryConnectionManager,
    RoomRegistry, ServerConfig,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coopsweeper=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting coopsweeper server");
    let config = ServerConfig::from_env();

    let connection_manager = Arc::new(InMemoryConnectionManager::new());
    let (router, _router_task) =
        ConnectionRouter::new(RoomRegistry::new(), connection_manager).spawn();

    tokio::spawn(start_cleanup_task(router.clone(), config.cleanup.clone()));

    let app = build_app(AppState::new(router), config.static_dir.as_deref());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Server running");
    axum::serve(listener, app).await
}
