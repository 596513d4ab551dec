use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CampaignStatus {
    Active,
    Closed,
}

/// Data scraped from an external fundraising page.
///
/// Only `fetched_at` is guaranteed; every other field is best-effort and
/// callers may prefer manually entered values (e.g. the PIX key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub goal: Option<Decimal>,
    pub raised: Option<Decimal>,
    /// Percentage of the goal reached, always within `[0, 100]`. Serialized
    /// as `progresso`, the key campaign consumers already read.
    #[serde(rename = "progresso")]
    pub progress: Decimal,
    pub donors: Option<u64>,
    pub hearts: Option<u64>,
    pub pix_key: Option<String>,
    pub status: Option<CampaignStatus>,
    /// Set when goal and raised could not be told apart with confidence.
    pub needs_review: bool,
    pub fetched_at: DateTime<Utc>,
}

impl CampaignSnapshot {
    /// A snapshot carrying nothing but its timestamp.
    #[must_use]
    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self {
            title: None,
            image_url: None,
            goal: None,
            raised: None,
            progress: Decimal::ZERO,
            donors: None,
            hearts: None,
            pix_key: None,
            status: None,
            needs_review: false,
            fetched_at,
        }
    }
}

/// `raised / goal * 100`, clamped to `[0, 100]` and rounded to two places.
/// A missing or non-positive goal yields zero.
#[must_use]
pub fn progress_percent(goal: Option<Decimal>, raised: Option<Decimal>) -> Decimal {
    let (Some(goal), Some(raised)) = (goal, raised) else {
        return Decimal::ZERO;
    };
    if goal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let Some(ratio) = raised.checked_div(goal) else {
        return Decimal::ZERO;
    };
    let pct = ratio.saturating_mul(Decimal::ONE_HUNDRED);
    pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED).round_dp(2)
}
