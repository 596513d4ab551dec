//! Per-platform follower-count extraction.
//!
//! Every platform follows the same template: normalize the user's input to a
//! profile URL, render it, then try a fixed list of named strategies until
//! one yields a parseable count. Platforms differ only in their normalizer
//! and strategy list.

use std::future::Future;
use std::sync::LazyLock;

use doa_core::{ExtractionResult, Platform};
use regex::Regex;
use scraper::Html;

use crate::browser::BrowserError;
use crate::count::try_parse_count;
use crate::html::visible_text;

mod facebook;
mod instagram;
mod kwai;
mod profile_url;
mod threads;
mod tiktok;
mod youtube;

/// A rendered page: final HTML plus the visible text of `<body>`.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
    pub text: String,
}

impl RenderedPage {
    #[must_use]
    pub fn new(url: impl Into<String>, html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            text: text.into(),
        }
    }

    /// Builds a page from static HTML, deriving the visible text.
    #[must_use]
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let text = visible_text(&Html::parse_document(&html));
        Self {
            url: url.into(),
            html,
            text,
        }
    }

    pub(crate) fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Turns a URL into a [`RenderedPage`].
pub trait PageRenderer: Sync {
    fn render(&self, url: &str) -> impl Future<Output = Result<RenderedPage, BrowserError>> + Send;
}

/// A named way of locating the raw count text on a page.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub find: fn(&RenderedPage) -> Option<String>,
}

/// Normalizer plus ordered strategies for one platform.
#[derive(Clone, Copy)]
pub struct PlatformExtractor {
    pub(crate) platform: Platform,
    pub(crate) normalize: fn(&str) -> Option<String>,
    pub(crate) strategies: &'static [Strategy],
}

impl PlatformExtractor {
    /// The extractor for `platform`, or `None` for platforms that are never
    /// scraped.
    #[must_use]
    pub fn for_platform(platform: Platform) -> Option<Self> {
        match platform {
            Platform::Instagram => Some(instagram::EXTRACTOR),
            Platform::Youtube => Some(youtube::EXTRACTOR),
            Platform::Tiktok => Some(tiktok::EXTRACTOR),
            Platform::Facebook => Some(facebook::EXTRACTOR),
            Platform::Kwai => Some(kwai::EXTRACTOR),
            Platform::Threads => Some(threads::EXTRACTOR),
            Platform::Whatsapp | Platform::X | Platform::Telegram => None,
        }
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Canonical profile URL for a full URL or bare handle.
    #[must_use]
    pub fn normalize_url(&self, input: &str) -> Option<String> {
        (self.normalize)(input)
    }

    /// Runs the strategies in order; the first parseable result wins.
    #[must_use]
    pub fn find_count(&self, page: &RenderedPage) -> Option<(&'static str, u64)> {
        self.strategies.iter().find_map(|strategy| {
            let raw = (strategy.find)(page)?;
            match try_parse_count(&raw) {
                Some(count) => Some((strategy.name, count)),
                None => {
                    tracing::debug!(
                        platform = %self.platform,
                        strategy = strategy.name,
                        raw = %raw,
                        "strategy matched unparseable text"
                    );
                    None
                }
            }
        })
    }

    /// Normalizes, renders and extracts. Never fails; problems are reported
    /// in the result's `error` field, prefixed with the platform label.
    pub async fn extract<R: PageRenderer>(&self, renderer: &R, input: &str) -> ExtractionResult {
        let label = self.platform.label();

        let Some(url) = self.normalize_url(input) else {
            return ExtractionResult::failed(format!("{label}: invalid profile URL or username"));
        };

        let page = match renderer.render(&url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(platform = %self.platform, url, error = %e, "profile render failed");
                return ExtractionResult::failed(format!("{label}: {e}"));
            }
        };

        match self.find_count(&page) {
            Some((strategy, count)) => {
                tracing::debug!(platform = %self.platform, url, strategy, count, "follower count extracted");
                ExtractionResult::found(count)
            }
            None => {
                tracing::warn!(platform = %self.platform, url, "no strategy matched");
                ExtractionResult::failed(format!("{label}: could not extract follower count"))
            }
        }
    }
}

/// Count token: digits with separators and an optional magnitude suffix.
/// The suffix must end on a word boundary, so `12 milhões` is never read as
/// `12 mil`.
const COUNT: &str = r"(\d[\d.,]*(?:\s?(?:milh(?:ões|oes|ão|ao)|mil|mi|bi|[kmb])\b)?)";

/// `(?i)<count>\s*(?:de\s+)?(?:<keywords>)\b`, capturing the count. The
/// optional `de` covers Portuguese forms like `1,2 mi de inscritos`.
pub(crate) fn count_before(keywords: &str) -> Regex {
    Regex::new(&format!(r"(?i){COUNT}\s*(?:de\s+)?(?:{keywords})\b")).expect("valid regex")
}

pub(crate) fn first_capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

static LEADING_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)^\s*{COUNT}")).expect("valid regex"));

/// The count at the start of `text`, e.g. `"1,2 mil seguidores"` → `"1,2 mil"`.
pub(crate) fn leading_count(text: &str) -> Option<String> {
    first_capture(&LEADING_COUNT, text)
}
