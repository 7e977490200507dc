//! Follow-up worker
//!
//! Drains the follow-up queue on a fixed period until the process is asked
//! to stop. Each tick is one `FollowUpService::process_due` batch; the queue
//! lease makes it safe to run several workers (or the HTTP trigger) at once.

mod worker;

pub use worker::{poll_period, shutdown_signal, Worker};

use inbox_common::{AppConfig, AppError};
use inbox_service::Infrastructure;
use tracing::info;

/// Connect to the backing services and poll until Ctrl-C or SIGTERM
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let infrastructure = Infrastructure::connect(&config).await?;
    let context = infrastructure.service_context(&config)?;

    let worker = Worker::new(context, poll_period(config.follow_up.poll_interval_secs));
    let ticks = worker.run_until(shutdown_signal()).await;

    info!(ticks, "Follow-up worker stopped");
    Ok(())
}
