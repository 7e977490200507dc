//! Follow-up worker entry point
//!
//! Run with:
//! ```bash
//! cargo run -p inbox-worker
//! ```
//!
//! Shares the API's environment configuration; the poll period comes from
//! `FOLLOWUP_POLL_INTERVAL_SECS`.

use inbox_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        poll_interval_secs = config.follow_up.poll_interval_secs,
        batch_size = config.follow_up.batch_size,
        "Starting follow-up worker"
    );

    if let Err(e) = inbox_worker::run(config).await {
        error!(error = %e, "Worker failed");
        std::process::exit(1);
    }
}
