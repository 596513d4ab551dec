use std::future::Future;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Social platforms a creator profile can link to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Youtube,
    Tiktok,
    Facebook,
    Kwai,
    Threads,
    Whatsapp,
    X,
    Telegram,
}

/// Platforms that are never scraped. Orchestration skips them without
/// calling any extractor.
pub const UNSUPPORTED_PLATFORMS: [Platform; 3] =
    [Platform::Whatsapp, Platform::X, Platform::Telegram];

impl Platform {
    pub const ALL: [Platform; 9] = [
        Platform::Instagram,
        Platform::Youtube,
        Platform::Tiktok,
        Platform::Facebook,
        Platform::Kwai,
        Platform::Threads,
        Platform::Whatsapp,
        Platform::X,
        Platform::Telegram,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
            Platform::Facebook => "facebook",
            Platform::Kwai => "kwai",
            Platform::Threads => "threads",
            Platform::Whatsapp => "whatsapp",
            Platform::X => "x",
            Platform::Telegram => "telegram",
        }
    }

    /// Human-facing label used as the prefix of extraction error messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Youtube => "YouTube",
            Platform::Tiktok => "TikTok",
            Platform::Facebook => "Facebook",
            Platform::Kwai => "Kwai",
            Platform::Threads => "Threads",
            Platform::Whatsapp => "WhatsApp",
            Platform::X => "X",
            Platform::Telegram => "Telegram",
        }
    }

    #[must_use]
    pub fn is_scrapeable(self) -> bool {
        !UNSUPPORTED_PLATFORMS.contains(&self)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        if key == "twitter" {
            return Ok(Platform::X);
        }
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == key)
            .ok_or_else(|| CoreError::UnknownPlatform(s.to_string()))
    }
}

/// A social-network row as seen by the scraping subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialNetworkRecord {
    pub id: i64,
    pub platform: Platform,
    pub url: String,
    pub username: String,
    pub followers: Option<i64>,
    pub followers_updated_at: Option<DateTime<Utc>>,
    pub update_error: Option<String>,
}

/// Outcome of one follower-count extraction.
///
/// A successful path sets exactly one field. Both `None` means the extraction
/// ran but learned nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub followers: Option<u64>,
    pub error: Option<String>,
}

impl ExtractionResult {
    #[must_use]
    pub fn found(followers: u64) -> Self {
        Self {
            followers: Some(followers),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            followers: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.followers.is_none() && self.error.is_none()
    }
}

/// The values written back to a social-network row after an extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowerUpdate {
    pub followers: Option<i64>,
    pub updated_at: DateTime<Utc>,
    pub error: Option<String>,
}

impl FollowerUpdate {
    /// Converts an extraction result into a row update.
    ///
    /// Returns `None` for an empty result: nothing was learned, so nothing
    /// may be written.
    #[must_use]
    pub fn from_result(result: &ExtractionResult, now: DateTime<Utc>) -> Option<Self> {
        if result.is_empty() {
            return None;
        }
        Some(Self {
            followers: result
                .followers
                .map(|n| i64::try_from(n).unwrap_or(i64::MAX)),
            updated_at: now,
            error: result.error.clone(),
        })
    }
}

/// Write side of the social-network table, as needed by the batch updater.
pub trait FollowerStore: Sync {
    type Error: std::fmt::Display + Send;

    fn save_follower_update(
        &self,
        id: i64,
        update: &FollowerUpdate,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
