//! Follower-count and campaign scraping.
//!
//! Follower counts are read from rendered profile pages through a shared
//! headless browser; campaign pages are fetched over plain HTTP.

pub mod batch;
pub mod browser;
pub mod campaign;
pub mod count;
pub mod error;
pub mod extract;
pub mod followers;
mod html;
mod rate_limit;

pub use batch::{update_all, BatchConfig, BatchSummary};
pub use browser::{
    BrowserError, BrowserHandle, BrowserLauncher, BrowserSession, ChromeBrowser, ChromeLauncher,
    ChromeRenderer, PageOptions,
};
pub use campaign::{parse_campaign_html, validate_campaign_url, CampaignScraper};
pub use count::{parse_count, try_parse_count};
pub use error::ScraperError;
pub use extract::{PageRenderer, PlatformExtractor, RenderedPage, Strategy};
pub use followers::{FollowerCountService, FollowerCounter};
