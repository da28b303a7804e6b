use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::blockchain::backoff::Sleeper;
use crate::notify::{format_heartbeat_message, AlertSink};

#[derive(Debug, Clone, Copy)]
pub struct HeartbeatSchedule {
    /// Quiet period before the first heartbeat.
    pub initial_delay: Duration,
    pub interval: Duration,
}

/// Send a "still running" message on a fixed schedule until `shutdown` is
/// cancelled. Independent of feed sessions and reconnects.
pub async fn run_heartbeat<S: Sleeper>(
    sink: AlertSink,
    schedule: HeartbeatSchedule,
    sleeper: S,
    shutdown: CancellationToken,
) {
    let message = format_heartbeat_message(schedule.interval);
    let mut delay = schedule.initial_delay;

    info!(
        "Heartbeat scheduled every {:?} after {:?}",
        schedule.interval, schedule.initial_delay
    );

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = sleeper.sleep(delay) => {}
        }

        if shutdown.is_cancelled() {
            break;
        }

        sink.notify(&message).await;
        delay = schedule.interval;
    }

    info!("Heartbeat stopped");
}
