use std::sync::LazyLock;

use doa_core::Platform;
use regex::Regex;
use scraper::Selector;

use super::profile_url::{classify, first_segment_handle, ProfileInput};
use super::{count_before, first_capture, leading_count, PlatformExtractor, RenderedPage, Strategy};
use crate::html::meta_contents;

pub(super) const EXTRACTOR: PlatformExtractor = PlatformExtractor {
    platform: Platform::Threads,
    normalize: normalize_url,
    strategies: &[
        Strategy {
            name: "meta_description",
            find: meta_description,
        },
        Strategy {
            name: "titled_count",
            find: titled_count,
        },
        Strategy {
            name: "visible_text",
            find: visible_text,
        },
    ],
};

const HOSTS: &[&str] = &["threads.net", "threads.com"];

static FOLLOWERS: LazyLock<Regex> = LazyLock::new(|| count_before("followers|seguidores"));
static TITLED_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span[title]").expect("valid selector"));

fn normalize_url(input: &str) -> Option<String> {
    let handle = match classify(input, HOSTS)? {
        ProfileInput::Url(url) => first_segment_handle(&url)?,
        ProfileInput::Handle(handle) => handle,
    };
    Some(format!("https://www.threads.net/@{handle}"))
}

/// `"1.2M Followers • 34 Threads • See the latest conversations with @creator."`
fn meta_description(page: &RenderedPage) -> Option<String> {
    meta_contents(&page.document(), &["description", "og:description"])
        .iter()
        .find_map(|content| first_capture(&FOLLOWERS, content))
}

/// The exact count is the `title` of the span inside "N followers".
fn titled_count(page: &RenderedPage) -> Option<String> {
    let document = page.document();
    document.select(&TITLED_SPAN).find_map(|span| {
        let parent_text = span
            .parent()
            .and_then(scraper::ElementRef::wrap)
            .map(|parent| parent.text().collect::<String>())
            .unwrap_or_default()
            .to_lowercase();
        if parent_text.contains("followers") || parent_text.contains("seguidores") {
            span.value().attr("title").and_then(leading_count)
        } else {
            None
        }
    })
}

fn visible_text(page: &RenderedPage) -> Option<String> {
    first_capture(&FOLLOWERS, &page.text)
}
