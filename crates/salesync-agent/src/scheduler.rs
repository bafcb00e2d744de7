//! Background trigger polling.
//!
//! A single cron job polls the local clock and hands each tick to the
//! [`Orchestrator`], which decides whether the daily run fires.

use std::sync::Arc;

use chrono::Local;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::orchestrator::{Orchestrator, TickAction};
use crate::pipeline::SalesSource;

/// Builds and starts the polling scheduler.
///
/// The returned [`JobScheduler`] must be kept alive for as long as runs
/// should fire; call [`JobScheduler::shutdown`] to stop it.
///
/// `cron` is the poll cadence, not the run time. It must tick at least once
/// per minute or the configured run minute can be missed.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is rejected, or the scheduler fails to start.
pub async fn build_scheduler<S: SalesSource + 'static>(
    orchestrator: Arc<Orchestrator<S>>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let run_at = orchestrator.run_at();
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let orchestrator = Arc::clone(&orchestrator);

        Box::pin(async move {
            let now = Local::now().naive_local();
            match orchestrator.tick(now) {
                TickAction::Started(_) => {
                    tracing::debug!(now = %now, "scheduler: run handed off");
                }
                TickAction::SkippedBusy | TickAction::Suppressed | TickAction::NoMatch => {}
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(poll = cron, run_at = %run_at, "scheduler: started");
    Ok(scheduler)
}
