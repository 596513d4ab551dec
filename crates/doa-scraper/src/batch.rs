//! Batched follower refresh across every stored social-network link.
//!
//! Links are processed in fixed-size chunks. Items within a chunk run
//! concurrently; chunks run one after another with a pause in between so
//! the target sites are not hammered.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use doa_core::{AppConfig, ExtractionResult, FollowerStore, FollowerUpdate, Platform, SocialNetworkRecord};
use futures::future::join_all;

use crate::followers::FollowerCounter;

pub const DEFAULT_MAX_CONCURRENT: usize = 2;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(2_500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Items dispatched concurrently per chunk. Values below 1 are treated as 1.
    pub max_concurrent: usize,
    pub delay_between_batches: Duration,
    /// Consecutive failures after which a platform's remaining links are
    /// skipped for the rest of the run. `0` disables the breaker.
    pub failure_threshold: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            delay_between_batches: DEFAULT_BATCH_DELAY,
            failure_threshold: 0,
        }
    }
}

impl BatchConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent: config.scraper_max_concurrent,
            delay_between_batches: Duration::from_millis(config.scraper_batch_delay_ms),
            failure_threshold: config.scraper_failure_threshold,
        }
    }
}

/// Counters describing one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Records handed to the run.
    pub considered: usize,
    /// Unsupported platform or empty URL.
    pub skipped: usize,
    /// Records actually sent to the extractor.
    pub processed: usize,
    pub batches: usize,
    pub delays: usize,
    pub written: usize,
    pub write_failures: usize,
    /// Results with neither a count nor an error; nothing was written.
    pub empty_results: usize,
    /// Skipped because the platform's breaker had tripped.
    pub tripped: usize,
}

enum Outcome {
    Written,
    WriteFailed,
    Empty,
}

/// Refreshes follower counts for `records`.
///
/// Never fails: extraction problems are persisted as the row's error and
/// write failures are logged and counted.
pub async fn update_all<C, S>(
    records: &[SocialNetworkRecord],
    counter: &C,
    store: &S,
    config: &BatchConfig,
) -> BatchSummary
where
    C: FollowerCounter,
    S: FollowerStore,
{
    let mut summary = BatchSummary {
        considered: records.len(),
        ..BatchSummary::default()
    };

    let eligible: Vec<&SocialNetworkRecord> = records
        .iter()
        .filter(|record| record.platform.is_scrapeable() && !record.url.trim().is_empty())
        .collect();
    summary.skipped = records.len() - eligible.len();

    let chunk_size = config.max_concurrent.max(1);
    let mut breaker = Breaker::new(config.failure_threshold);

    tracing::info!(
        considered = summary.considered,
        eligible = eligible.len(),
        chunk_size,
        "starting follower batch"
    );

    for chunk in eligible.chunks(chunk_size) {
        let mut dispatch = Vec::with_capacity(chunk.len());
        for record in chunk {
            if breaker.is_open(record.platform) {
                summary.tripped += 1;
                tracing::debug!(id = record.id, platform = %record.platform, "breaker open, skipping");
            } else {
                dispatch.push(*record);
            }
        }
        if dispatch.is_empty() {
            continue;
        }

        if summary.batches > 0 {
            tokio::time::sleep(config.delay_between_batches).await;
            summary.delays += 1;
        }
        summary.batches += 1;
        summary.processed += dispatch.len();

        let outcomes = join_all(dispatch.iter().map(|record| async move {
            let result = counter.follower_count(record.platform.as_str(), &record.url).await;
            let outcome = persist(store, record, &result).await;
            (record.platform, result, outcome)
        }))
        .await;

        for (platform, result, outcome) in outcomes {
            breaker.observe(platform, &result);
            match outcome {
                Outcome::Written => summary.written += 1,
                Outcome::WriteFailed => summary.write_failures += 1,
                Outcome::Empty => summary.empty_results += 1,
            }
        }

        tracing::info!(
            batch = summary.batches,
            size = dispatch.len(),
            "follower batch complete"
        );
    }

    tracing::info!(
        processed = summary.processed,
        written = summary.written,
        write_failures = summary.write_failures,
        skipped = summary.skipped,
        tripped = summary.tripped,
        "follower update finished"
    );

    summary
}

async fn persist<S: FollowerStore>(
    store: &S,
    record: &SocialNetworkRecord,
    result: &ExtractionResult,
) -> Outcome {
    let Some(update) = FollowerUpdate::from_result(result, Utc::now()) else {
        tracing::debug!(id = record.id, "empty extraction result, not writing");
        return Outcome::Empty;
    };

    if let Some(error) = &update.error {
        tracing::warn!(id = record.id, platform = %record.platform, error = %error, "follower extraction failed");
    }

    match store.save_follower_update(record.id, &update).await {
        Ok(()) => Outcome::Written,
        Err(e) => {
            tracing::error!(id = record.id, platform = %record.platform, error = %e, "failed to persist follower update");
            Outcome::WriteFailed
        }
    }
}

/// Per-platform consecutive-failure counter.
struct Breaker {
    threshold: usize,
    failures: HashMap<Platform, usize>,
}

impl Breaker {
    fn new(threshold: usize) -> Self {
        Self {
            threshold,
            failures: HashMap::new(),
        }
    }

    fn is_open(&self, platform: Platform) -> bool {
        self.threshold > 0 && self.failures.get(&platform).copied().unwrap_or(0) >= self.threshold
    }

    fn observe(&mut self, platform: Platform, result: &ExtractionResult) {
        if self.threshold == 0 {
            return;
        }
        if result.followers.is_some() {
            self.failures.remove(&platform);
        } else if result.error.is_some() {
            let failures = self.failures.entry(platform).or_insert(0);
            *failures += 1;
            if *failures == self.threshold {
                tracing::warn!(%platform, failures = *failures, "platform breaker tripped");
            }
        }
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
