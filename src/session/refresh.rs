//! Periodic balance refresh.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::session::manager::{Inner, SessionManager};

/// Re-query the balance every `period` while the session stays connected.
///
/// Holds only a weak reference, so dropping the last manager handle ends the
/// loop at the next tick.
pub(super) fn spawn_periodic_refresh(session: Weak<Inner>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(inner) = session.upgrade() else {
                break;
            };
            let manager = SessionManager::from_inner(inner);
            if !manager.session().is_connected() {
                break;
            }
            manager.refresh_balance().await;
        }

        tracing::debug!("Periodic balance refresh stopped");
    })
}
