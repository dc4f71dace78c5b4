//! Timer-driven re-aggregation.
//!
//! The first tick fires immediately, giving the startup cycle. Ticks that
//! land while a cycle is still running are skipped, not queued.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::aggregator::cycle::Aggregator;

pub struct Scheduler;

/// Running scheduler. Dropping the handle also ends the loop, but only
/// [`SchedulerHandle::stop`] waits for it.
pub struct SchedulerHandle {
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl Scheduler {
    pub fn spawn(aggregator: Arc<Aggregator>, interval: Duration) -> SchedulerHandle {
        let (shutdown, mut shutdown_rx) = broadcast::channel(1);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(interval_s = interval.as_secs(), "Scheduler started");

            loop {
                // shutdown is polled first so a tick that came due during a
                // long cycle cannot start another one after stop()
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        info!("Shutting down scheduler");
                        break;
                    }
                    _ = ticker.tick() => {
                        aggregator.run_cycle().await;
                    }
                }
            }
        });

        SchedulerHandle { shutdown, task }
    }
}

impl SchedulerHandle {
    /// Stop scheduling new cycles. A cycle already running is allowed to
    /// finish and publish before this returns.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            warn!(error = %e, "Scheduler task ended abnormally");
        }
    }
}
