//! Periodic rotation

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use super::KeyManager;

/// Run `rotate_all` every `period` until the task is aborted.
///
/// The first rotation happens one full period after start. Failures are
/// logged and the schedule continues.
pub fn spawn_scheduled_rotation(manager: KeyManager, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match manager.rotate_all().await {
                Ok(keys) => info!(
                    active = keys.active.len(),
                    rotated = keys.rotated.len(),
                    "Scheduled rotation complete"
                ),
                Err(e) => error!(error = %e, "Scheduled rotation failed"),
            }
        }
    })
}
