//! Poll loop

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use inbox_service::{FollowUpService, ServiceContext};
use tokio::signal;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Periodic driver for the follow-up processor
pub struct Worker {
    context: ServiceContext,
    period: Duration,
}

impl Worker {
    pub fn new(context: ServiceContext, period: Duration) -> Self {
        Self { context, period }
    }

    /// Process one batch of due items and log the outcome
    pub async fn tick(&self) {
        match FollowUpService::new(&self.context)
            .process_due(Utc::now())
            .await
        {
            Ok(report) if report.claimed == 0 => debug!("No follow-ups due"),
            Ok(report) => {
                info!(
                    claimed = report.claimed,
                    sent = report.sent,
                    failed = report.failed,
                    cancelled = report.cancelled,
                    rescheduled = report.rescheduled,
                    "Follow-up batch processed"
                );
                if report.unsettled() > 0 {
                    warn!(
                        unsettled = report.unsettled(),
                        "Some claimed follow-ups were left leased"
                    );
                }
            }
            Err(e) => error!(error = %e, "Follow-up batch failed"),
        }
    }

    /// Tick until `shutdown` resolves; returns the number of ticks run
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        poll_until(self.period, shutdown, || self.tick()).await
    }
}

/// Poll period for a configured interval; zero would make `tokio::time::interval` panic
#[must_use]
pub fn poll_period(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

/// Run `tick` every `period` (first run immediately) until `shutdown` resolves
///
/// A tick in flight is finished before the shutdown is observed, and ticks
/// that overrun the period push the schedule back instead of bursting.
async fn poll_until<F, T, Fut>(period: Duration, shutdown: F, mut tick: T) -> u64
where
    F: Future<Output = ()>,
    T: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut ticks = 0;
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            _ = ticker.tick() => {
                tick().await;
                ticks += 1;
            }
        }
    }
    ticks
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
