//! Periodic sweep of idle in-memory carts and expired session rows.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::AppState;

use super::auth::purge_expired_sessions;
use super::error::ApiError;

/// Statistics from a cleanup run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub carts_removed: usize,
    pub sessions_removed: u64,
}

/// Run one sweep using the idle window from `server.cart_idle_minutes`
pub async fn run_cleanup(state: &AppState) -> Result<CleanupStats, ApiError> {
    let max_idle = Duration::from_secs(state.config.server.cart_idle_minutes * 60);
    let carts_removed = state.carts.cleanup_expired(max_idle);
    let sessions_removed = purge_expired_sessions(&state.db).await?;

    if carts_removed > 0 || sessions_removed > 0 {
        tracing::debug!(
            carts_removed,
            sessions_removed,
            carts_remaining = state.carts.len(),
            "Cleanup complete"
        );
    }

    Ok(CleanupStats {
        carts_removed,
        sessions_removed,
    })
}

/// Spawn the background cleanup task
pub fn spawn_cleanup_task(state: Arc<AppState>) {
    let interval_secs = state.config.server.cleanup_interval.max(1);
    tracing::info!(
        interval_secs,
        cart_idle_minutes = state.config.server.cart_idle_minutes,
        "Starting cart and session cleanup task"
    );

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick.tick().await;
            if let Err(e) = run_cleanup(&state).await {
                tracing::error!(error = %e, "Cleanup cycle failed");
            }
        }
    });
}
