//! Vakinha campaign scraping.
//!
//! Campaign pages are server-rendered, so a plain HTTP GET is enough; no
//! browser is involved.

use std::time::Duration;

use chrono::Utc;
use doa_core::{AppConfig, CampaignSnapshot};
use reqwest::{Client, StatusCode, Url};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

mod amounts;
mod parse;
mod pix;

pub use amounts::{reconcile_goal_and_raised, Amount, AmountSource, Reconciled};
pub use parse::parse_campaign_html;

const CAMPAIGN_HOST: &str = "vakinha.com.br";

/// Checks that `url` is an http(s) campaign URL on the campaign site.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidCampaignUrl`] for blank input, unparseable
/// URLs, non-http schemes and foreign hosts.
pub fn validate_campaign_url(url: &str) -> Result<Url, ScraperError> {
    let invalid = |reason: &str| ScraperError::InvalidCampaignUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(invalid("URL is empty"));
    }
    let parsed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    if host != CAMPAIGN_HOST && !host.ends_with(&format!(".{CAMPAIGN_HOST}")) {
        return Err(invalid("host is not vakinha.com.br"));
    }
    Ok(parsed)
}

/// HTTP client for campaign pages.
///
/// Transient errors (429, 5xx, network failures) are retried with
/// exponential backoff up to `max_retries` additional attempts.
#[derive(Debug, Clone)]
pub struct CampaignScraper {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl CampaignScraper {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )
    }

    /// Fetches and parses a campaign page.
    ///
    /// Never fails: on any fetch error the returned snapshot carries only
    /// `fetched_at`.
    pub async fn scrape_campaign(&self, url: &str) -> CampaignSnapshot {
        let fetched_at = Utc::now();
        match self.fetch_html(url).await {
            Ok(html) => {
                let snapshot = parse_campaign_html(&html, fetched_at);
                tracing::info!(
                    url,
                    goal = ?snapshot.goal,
                    raised = ?snapshot.raised,
                    progress = %snapshot.progress,
                    "campaign scraped"
                );
                snapshot
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "campaign fetch failed");
                CampaignSnapshot::empty(fetched_at)
            }
        }
    }

    /// Fetches the raw page HTML, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status; 5xx
    ///   only after all retries.
    /// - [`ScraperError::Http`]: network or TLS failure after all retries.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(ScraperError::RateLimited {
                    domain: response.url().host_str().unwrap_or_default().to_string(),
                    retry_after_secs,
                });
            }

            if status == StatusCode::NOT_FOUND {
                return Err(ScraperError::NotFound {
                    url: url.to_string(),
                });
            }

            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            Ok(response.text().await?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_campaign_urls() {
        assert!(validate_campaign_url("https://www.vakinha.com.br/4242424").is_ok());
        assert!(validate_campaign_url(" http://vakinha.com.br/vaquinha/abrigo ").is_ok());
    }

    #[test]
    fn rejects_other_hosts_and_blank_input() {
        for url in [
            "",
            "   ",
            "not a url",
            "https://vakinha.com.br.evil.example/1",
            "https://example.com/vakinha.com.br",
            "ftp://www.vakinha.com.br/1",
        ] {
            assert!(
                matches!(
                    validate_campaign_url(url),
                    Err(ScraperError::InvalidCampaignUrl { .. })
                ),
                "expected rejection for {url:?}"
            );
        }
    }
}
