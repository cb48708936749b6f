use axum::{extract::State, Json};
use tracing::{debug, instrument};

use super::registry::RegistryStats;
use crate::shared::{AppError, AppState};

/// HTTP handler for room counters
///
/// GET /stats
#[instrument(name = "get_stats", skip(state))]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<RegistryStats>, AppError> {
    let stats = state.router.stats().await?;
    debug!(total_games = stats.total_games, "Stats requested");
    Ok(Json(stats))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
