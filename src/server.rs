use std::path::Path;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::room::{get_stats, health};
use crate::shared::AppState;
use crate::websockets::websocket_handler;

/// Assembles the HTTP surface; unmatched paths fall through to `static_dir` when given
pub fn build_app(app_state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/ws", get(websocket_handler))
        .route("/stats", get(get_stats))
        .route("/health", get(health));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
