//! Field extraction from a campaign page's HTML.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use doa_core::{progress_percent, CampaignSnapshot, CampaignStatus};
use regex::Regex;
use scraper::{Html, Selector};

use super::amounts::{find_amounts, reconcile_goal_and_raised};
use super::pix::find_pix_key;
use crate::count::try_parse_count;
use crate::html::{element_text, visible_text};

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https://static\.vakinha\.com\.br/uploads/[^"'\s)<>]+"#).expect("valid regex")
});
static DONORS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)(\d[\d.]*)\s*(?:doadores|doações|doacoes|apoiadores|pessoas\s+doaram)")
            .expect("valid regex"),
        Regex::new(r"(?i)(?:doadores|apoiadores)\s*:?\s*(\d[\d.]*)").expect("valid regex"),
    ]
});
static HEARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d.,]*(?:\s?(?:mil|k))?)\s*(?:corações|coracoes|curtidas)")
        .expect("valid regex")
});

const SITE_SUFFIX_SEPARATORS: [&str; 3] = [" | ", " - ", " – "];
const CLOSED_MARKERS: [&str; 2] = ["encerrada", "finalizada"];

/// Builds a snapshot from campaign HTML. Missing fields stay `None`.
#[must_use]
pub fn parse_campaign_html(html: &str, fetched_at: DateTime<Utc>) -> CampaignSnapshot {
    let document = Html::parse_document(html);
    let text = visible_text(&document);

    let (goal, raised) = find_amounts(&text);
    let amounts = reconcile_goal_and_raised(goal, raised);
    if amounts.needs_review {
        tracing::warn!(
            goal = ?amounts.goal,
            raised = ?amounts.raised,
            swapped = amounts.swapped,
            "campaign amounts need manual review"
        );
    }

    CampaignSnapshot {
        title: title(&document),
        image_url: IMAGE.find(html).map(|m| m.as_str().to_string()),
        goal: amounts.goal,
        raised: amounts.raised,
        progress: progress_percent(amounts.goal, amounts.raised),
        donors: labeled_count(&*DONORS, &text),
        hearts: labeled_count(std::slice::from_ref(&*HEARTS), &text),
        pix_key: find_pix_key(&text),
        status: Some(status(&text)),
        needs_review: amounts.needs_review,
        fetched_at,
    }
}

fn title(document: &Html) -> Option<String> {
    let heading = document
        .select(&H1)
        .map(element_text)
        .find(|t| !t.is_empty());
    heading.or_else(|| {
        document
            .select(&TITLE)
            .map(element_text)
            .map(|t| strip_site_suffix(&t).to_string())
            .find(|t| !t.is_empty())
    })
}

/// `"Ajude a Maria | Vakinha"` → `"Ajude a Maria"`.
fn strip_site_suffix(title: &str) -> &str {
    for separator in SITE_SUFFIX_SEPARATORS {
        if let Some((head, tail)) = title.rsplit_once(separator) {
            if tail.to_lowercase().contains("vakinha") {
                return head.trim();
            }
        }
    }
    title.trim()
}

fn labeled_count(patterns: &[Regex], text: &str) -> Option<u64> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| try_parse_count(m.as_str()))
    })
}

fn status(text: &str) -> CampaignStatus {
    let lower = text.to_lowercase();
    if CLOSED_MARKERS.iter().any(|marker| lower.contains(marker)) {
        CampaignStatus::Closed
    } else {
        CampaignStatus::Active
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
