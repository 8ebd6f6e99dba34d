use chrono::Utc;
use tokio::time::{sleep, Duration};
use tracing::info;

use crate::state::AppState;

/// Periodic freshness pass over deadline-carrying records. Every engine
/// operation reaps on its own; this loop only keeps list views from showing
/// stale CLAIMED requests or PENDING invitations.
pub async fn start_expiry_sweeper(state: AppState, interval_seconds: u64) {
    info!("Expiry sweeper started ({}s interval)", interval_seconds);

    loop {
        sleep(Duration::from_secs(interval_seconds)).await;
        let now = Utc::now();

        let claims = state.board.write().await.sweep(now);
        let invitations = state.negotiations.write().await.sweep(now);

        if claims + invitations > 0 {
            info!(claims, invitations, "expiry sweep flipped stale records");
        }
    }
}
