use std::sync::LazyLock;

use doa_core::Platform;
use regex::Regex;
use scraper::Selector;
use serde_json::Value;

use super::profile_url::{classify, is_valid_handle, segments, ProfileInput};
use super::{count_before, first_capture, leading_count, PlatformExtractor, RenderedPage, Strategy};
use crate::html::element_text;

pub(super) const EXTRACTOR: PlatformExtractor = PlatformExtractor {
    platform: Platform::Youtube,
    normalize: normalize_url,
    strategies: &[
        Strategy {
            name: "json_ld",
            find: json_ld,
        },
        Strategy {
            name: "subscriber_element",
            find: subscriber_element,
        },
        Strategy {
            name: "initial_data",
            find: initial_data,
        },
        Strategy {
            name: "visible_text",
            find: visible_text,
        },
    ],
};

const HOSTS: &[&str] = &["youtube.com"];

static SUBSCRIBERS: LazyLock<Regex> = LazyLock::new(|| count_before("subscribers|inscritos"));
static SUBSCRIBER_COUNT_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""subscriberCountText"\s*:\s*\{[^{}]*?"simpleText"\s*:\s*"([^"]+)""#)
        .expect("valid regex")
});
static SUBSCRIBER_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""content"\s*:\s*"([^"]*?(?:subscribers|inscritos))""#).expect("valid regex")
});
static LD_JSON: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});
static SUBSCRIBER_ELEMENT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[data-subscriber-count], #subscriber-count").expect("valid selector")
});

/// Accepts `@handle`, `/@handle`, `/channel/<id>`, `/c/<name>` and
/// `/user/<name>` forms. Video and shorts links are rejected.
fn normalize_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if let Some(handle) = trimmed.strip_prefix('@') {
        return is_valid_handle(handle).then(|| format!("https://www.youtube.com/@{handle}"));
    }

    let ProfileInput::Url(url) = classify(trimmed, HOSTS)? else {
        return None;
    };
    match segments(&url).as_slice() {
        [first, ..] if first.starts_with('@') && is_valid_handle(&first[1..]) => {
            Some(format!("https://www.youtube.com/{first}"))
        }
        [kind @ ("channel" | "c" | "user"), id, ..] if is_valid_handle(id) => {
            Some(format!("https://www.youtube.com/{kind}/{id}"))
        }
        _ => None,
    }
}

fn json_ld(page: &RenderedPage) -> Option<String> {
    let document = page.document();
    document
        .select(&LD_JSON)
        .filter_map(|script| serde_json::from_str::<Value>(&script.text().collect::<String>()).ok())
        .find_map(|value| subscriber_statistic(&value))
}

/// Finds `userInteractionCount` of a subscribe/follow `InteractionCounter`
/// anywhere in a JSON-LD document.
fn subscriber_statistic(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            let is_subscribe = map
                .get("interactionType")
                .map(|t| match t {
                    Value::String(s) => s.as_str(),
                    Value::Object(o) => o.get("@type").and_then(Value::as_str).unwrap_or(""),
                    _ => "",
                })
                .is_some_and(|t| t.contains("Subscribe") || t.contains("Follow"));
            if is_subscribe {
                match map.get("userInteractionCount") {
                    Some(Value::Number(n)) => return Some(n.to_string()),
                    Some(Value::String(s)) => return Some(s.clone()),
                    _ => {}
                }
            }
            map.values().find_map(subscriber_statistic)
        }
        Value::Array(items) => items.iter().find_map(subscriber_statistic),
        _ => None,
    }
}

fn subscriber_element(page: &RenderedPage) -> Option<String> {
    let document = page.document();
    document.select(&SUBSCRIBER_ELEMENT).find_map(|el| {
        el.value()
            .attr("data-subscriber-count")
            .and_then(leading_count)
            .or_else(|| leading_count(&element_text(el)))
    })
}

/// `ytInitialData` embeds either `"subscriberCountText":{"simpleText":"1.2M subscribers"}`
/// or, in newer headers, a metadata row `"content":"1.2M subscribers"`.
fn initial_data(page: &RenderedPage) -> Option<String> {
    [&*SUBSCRIBER_COUNT_TEXT, &*SUBSCRIBER_CONTENT]
        .into_iter()
        .find_map(|re| first_capture(re, &page.html).and_then(|text| leading_count(&text)))
}

fn visible_text(page: &RenderedPage) -> Option<String> {
    first_capture(&SUBSCRIBERS, &page.text)
}
