//! Follower command handlers. Each run owns its browser session and closes
//! it before returning.

use std::sync::Arc;

use doa_core::{AppConfig, ExtractionResult, Platform, SocialNetworkRecord};
use doa_scraper::{
    update_all, BatchConfig, BatchSummary, BrowserSession, ChromeLauncher, ChromeRenderer,
    FollowerCountService, PageOptions,
};

fn follower_service(
    config: &AppConfig,
) -> (
    Arc<BrowserSession<ChromeLauncher>>,
    FollowerCountService<ChromeRenderer>,
) {
    let session = Arc::new(BrowserSession::new(
        ChromeLauncher::from_app_config(config),
        config.build_phase,
    ));
    let renderer = ChromeRenderer::new(Arc::clone(&session), PageOptions::from_app_config(config));
    (session, FollowerCountService::new(renderer))
}

/// Links the batch would hand to an extractor.
pub(crate) fn eligible_records(records: &[SocialNetworkRecord]) -> Vec<&SocialNetworkRecord> {
    records
        .iter()
        .filter(|r| r.platform.is_scrapeable() && !r.url.trim().is_empty())
        .collect()
}

/// Refresh follower counts, optionally for a single platform.
///
/// With `dry_run` the eligible links are printed and nothing is scraped or
/// written.
///
/// # Errors
///
/// Returns an error if `platform` is not a known platform name or the
/// links cannot be loaded. Per-link failures are stored on the link.
pub(crate) async fn run_followers_update(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    platform: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let records = match platform {
        Some(name) => {
            let platform = name.parse::<Platform>()?;
            if !platform.is_scrapeable() {
                anyhow::bail!("{} links have no follower count to refresh", platform.label());
            }
            doa_db::list_social_networks_by_platform(pool, platform).await?
        }
        None => doa_db::list_social_networks_for_update(pool).await?,
    };

    tracing::info!(
        platform = platform.unwrap_or("all"),
        links = records.len(),
        dry_run,
        "loaded links for follower update"
    );

    if dry_run {
        let eligible = eligible_records(&records);
        println!(
            "dry-run: would refresh {} of {} links",
            eligible.len(),
            records.len()
        );
        for record in eligible {
            println!("  #{} {:<9} {}", record.id, record.platform.as_str(), record.url);
        }
        return Ok(());
    }

    let (session, service) = follower_service(config);
    let store = doa_db::PgFollowerStore::new(pool.clone());
    let batch_config = BatchConfig::from_app_config(config);
    let summary = update_all(&records, &service, &store, &batch_config).await;
    session.close_browser().await;

    println!("{}", format_summary(&summary));
    Ok(())
}

/// Run a single extraction and print the outcome.
pub(crate) async fn run_followers_check(config: &AppConfig, platform: &str, url: &str) {
    let (session, service) = follower_service(config);
    let result = service.get_follower_count(platform, url).await;
    session.close_browser().await;

    if let Some(error) = result.error.as_deref() {
        tracing::warn!(platform, url, error, "follower check failed");
    }
    println!("{}", format_result(platform, url, &result));
}

pub(crate) fn format_summary(summary: &BatchSummary) -> String {
    let mut line = format!(
        "followers updated: {} written, {} processed in {} batches, {} skipped",
        summary.written, summary.processed, summary.batches, summary.skipped
    );
    if summary.write_failures > 0 {
        line.push_str(&format!(", {} write failures", summary.write_failures));
    }
    if summary.tripped > 0 {
        line.push_str(&format!(", {} skipped by breaker", summary.tripped));
    }
    line
}

pub(crate) fn format_result(platform: &str, url: &str, result: &ExtractionResult) -> String {
    match (result.followers, result.error.as_deref()) {
        (Some(count), _) => format!("{platform} {url}: {count} followers"),
        (None, Some(error)) => format!("{platform} {url}: error: {error}"),
        (None, None) => format!("{platform} {url}: no result"),
    }
}
