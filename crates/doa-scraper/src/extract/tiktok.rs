use std::sync::LazyLock;

use doa_core::Platform;
use regex::Regex;
use scraper::Selector;

use super::profile_url::{classify, first_segment_handle, ProfileInput};
use super::{count_before, first_capture, leading_count, PlatformExtractor, RenderedPage, Strategy};
use crate::html::{element_text, meta_contents};

pub(super) const EXTRACTOR: PlatformExtractor = PlatformExtractor {
    platform: Platform::Tiktok,
    normalize: normalize_url,
    strategies: &[
        Strategy {
            name: "followers_element",
            find: followers_element,
        },
        Strategy {
            name: "embedded_state",
            find: embedded_state,
        },
        Strategy {
            name: "meta_description",
            find: meta_description,
        },
        Strategy {
            name: "visible_text",
            find: visible_text,
        },
    ],
};

const HOSTS: &[&str] = &["tiktok.com"];

static FOLLOWERS: LazyLock<Regex> = LazyLock::new(|| count_before("followers|seguidores"));
static FOLLOWER_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""followerCount"\s*:\s*(\d+)"#).expect("valid regex"));
static FOLLOWERS_ELEMENT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[data-e2e="followers-count"]"#).expect("valid selector")
});

fn normalize_url(input: &str) -> Option<String> {
    let handle = match classify(input, HOSTS)? {
        ProfileInput::Url(url) => first_segment_handle(&url)?,
        ProfileInput::Handle(handle) => handle,
    };
    Some(format!("https://www.tiktok.com/@{handle}"))
}

fn followers_element(page: &RenderedPage) -> Option<String> {
    let document = page.document();
    document
        .select(&FOLLOWERS_ELEMENT)
        .find_map(|el| leading_count(&element_text(el)))
}

/// `__UNIVERSAL_DATA_FOR_REHYDRATION__` carries `"followerCount":12345`.
fn embedded_state(page: &RenderedPage) -> Option<String> {
    first_capture(&FOLLOWER_COUNT, &page.html)
}

/// `"Creator (@creator) on TikTok | 1.2M Likes. 345.6K Followers. ..."`
fn meta_description(page: &RenderedPage) -> Option<String> {
    meta_contents(&page.document(), &["description", "og:description"])
        .iter()
        .find_map(|content| first_capture(&FOLLOWERS, content))
}

fn visible_text(page: &RenderedPage) -> Option<String> {
    first_capture(&FOLLOWERS, &page.text)
}
