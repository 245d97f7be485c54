//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring full scrape run.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use nilhub_scraper::ScrapeOrchestrator;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    orchestrator: Arc<ScrapeOrchestrator>,
    config: Arc<nilhub_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_scrape_job(&scheduler, orchestrator, &config).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring full scrape run.
///
/// Defaults to every Sunday at 02:00 UTC (`0 0 2 * * Sun`); the expression
/// comes from `NILHUB_SCRAPE_CRON`. Overlap with an in-flight run is
/// harmless: the orchestrator serializes runs internally.
async fn register_scrape_job(
    scheduler: &JobScheduler,
    orchestrator: Arc<ScrapeOrchestrator>,
    config: &nilhub_core::AppConfig,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(config.scrape_cron.as_str(), move |_uuid, _lock| {
        let orchestrator = Arc::clone(&orchestrator);

        Box::pin(async move {
            tracing::info!("scheduler: starting weekly social metrics run");
            let summary = orchestrator.scrape_all_profiles().await;
            tracing::info!(
                success = summary.success,
                failed = summary.failed,
                "scheduler: weekly social metrics run complete"
            );
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
