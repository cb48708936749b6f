use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, instrument, warn};

use crate::websockets::RouterHandle;

/// Configuration for the cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run the cleanup task
    pub cleanup_interval: Duration,
    /// How long a room must be inactive before deletion
    pub inactivity_threshold: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(10 * 60), // 10 minutes
            inactivity_threshold: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}

/// Periodically asks the router to evict idle rooms.
///
/// The sweep itself runs inside the router loop, so it never races with
/// player commands. Returns once the router has stopped.
#[instrument(skip(router))]
pub async fn start_cleanup_task(router: RouterHandle, config: CleanupConfig) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        inactivity_threshold_secs = config.inactivity_threshold.as_secs(),
        "Starting room cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);
    // the first tick completes immediately
    cleanup_interval.tick().await;

    loop {
        cleanup_interval.tick().await;
        debug!("Running room cleanup task");

        if router.sweep(config.inactivity_threshold).is_err() {
            warn!("Router stopped, ending room cleanup task");
            break;
        }
    }
}
