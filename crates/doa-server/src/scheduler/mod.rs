//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring follower-count refresh.

use std::sync::Arc;

use doa_scraper::{
    update_all, BatchConfig, BatchSummary, ChromeRenderer, FollowerCountService, FollowerCounter,
};
use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<doa_core::AppConfig>,
    followers: Arc<FollowerCountService<ChromeRenderer>>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_followers_job(&scheduler, pool, config, followers).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the follower refresh on `DOA_FOLLOWERS_CRON`.
///
/// A tick that fires while the previous run is still going is skipped.
async fn register_followers_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<doa_core::AppConfig>,
    followers: Arc<FollowerCountService<ChromeRenderer>>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);
    let batch_config = Arc::new(BatchConfig::from_app_config(&config));
    let running = Arc::new(Mutex::new(()));

    let job = Job::new_async(config.followers_cron.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let batch_config = Arc::clone(&batch_config);
        let followers = Arc::clone(&followers);
        let running = Arc::clone(&running);

        Box::pin(async move {
            let Ok(_guard) = running.try_lock() else {
                tracing::warn!("scheduler: previous follower run still in progress; skipping");
                return;
            };
            tracing::info!("scheduler: starting follower update run");
            if let Some(summary) = run_followers_job(&pool, followers.as_ref(), &batch_config).await
            {
                tracing::info!(
                    processed = summary.processed,
                    written = summary.written,
                    "scheduler: follower update run complete"
                );
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %config.followers_cron, "scheduler: follower update job registered");
    Ok(())
}

/// Loads every link and runs one batch over them.
///
/// Returns `None` when the link list cannot be loaded.
async fn run_followers_job<C: FollowerCounter>(
    pool: &PgPool,
    counter: &C,
    config: &BatchConfig,
) -> Option<BatchSummary> {
    let records = match doa_db::list_social_networks_for_update(pool).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load social networks");
            return None;
        }
    };

    if records.is_empty() {
        tracing::info!("scheduler: no social networks to update; skipping");
        return Some(BatchSummary::default());
    }

    let store = doa_db::PgFollowerStore::new(pool.clone());
    Some(update_all(&records, counter, &store, config).await)
}
