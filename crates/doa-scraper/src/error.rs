use thiserror::Error;

/// Errors from plain-HTTP campaign fetching.
///
/// Browser-side failures have their own [`crate::BrowserError`].
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid campaign URL \"{url}\": {reason}")]
    InvalidCampaignUrl { url: String, reason: String },
}
