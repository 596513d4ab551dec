//! Campaign command handlers.

use doa_core::AppConfig;
use doa_scraper::{validate_campaign_url, CampaignScraper};

/// Scrape one campaign page and print the snapshot as pretty JSON.
///
/// # Errors
///
/// Returns an error if `url` is not a Vakinha campaign URL or the HTTP
/// client cannot be built. Fetch failures still print a snapshot that
/// carries only `fetched_at`.
pub(crate) async fn run_campaign_scrape(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let url = validate_campaign_url(url)?;
    let scraper = CampaignScraper::from_app_config(config)?;

    let snapshot = scraper.scrape_campaign(url.as_str()).await;
    if snapshot.needs_review {
        tracing::warn!(url = %url, "goal and raised amounts may be swapped; review before saving");
    }

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
