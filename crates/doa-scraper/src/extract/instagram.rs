use std::sync::LazyLock;

use doa_core::Platform;
use regex::Regex;
use scraper::Selector;

use super::profile_url::{classify, first_segment_handle, ProfileInput};
use super::{count_before, first_capture, leading_count, PlatformExtractor, RenderedPage, Strategy};
use crate::html::{element_text, meta_contents};

pub(super) const EXTRACTOR: PlatformExtractor = PlatformExtractor {
    platform: Platform::Instagram,
    normalize: normalize_url,
    strategies: &[
        Strategy {
            name: "meta_description",
            find: meta_description,
        },
        Strategy {
            name: "followers_link",
            find: followers_link,
        },
        Strategy {
            name: "visible_text",
            find: visible_text,
        },
    ],
};

const HOSTS: &[&str] = &["instagram.com", "instagr.am"];
const RESERVED: &[&str] = &["p", "reel", "reels", "explore", "stories", "accounts", "tv"];

static FOLLOWERS: LazyLock<Regex> = LazyLock::new(|| count_before("followers|seguidores"));
static FOLLOWERS_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/followers"]"#).expect("valid selector"));
static TITLED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[title]").expect("valid selector"));

fn normalize_url(input: &str) -> Option<String> {
    let handle = match classify(input, HOSTS)? {
        ProfileInput::Url(url) => first_segment_handle(&url)?,
        ProfileInput::Handle(handle) => handle,
    };
    if RESERVED.contains(&handle.to_ascii_lowercase().as_str()) {
        return None;
    }
    Some(format!("https://www.instagram.com/{handle}/"))
}

/// `"1,234 Followers, 56 Following, 78 Posts - ..."`
fn meta_description(page: &RenderedPage) -> Option<String> {
    meta_contents(&page.document(), &["description", "og:description"])
        .iter()
        .find_map(|content| first_capture(&FOLLOWERS, content))
}

/// The exact count sits in the `title` of a span inside the followers link.
fn followers_link(page: &RenderedPage) -> Option<String> {
    let document = page.document();
    let link = document.select(&FOLLOWERS_LINK).next()?;
    link.select(&TITLED)
        .find_map(|el| el.value().attr("title").and_then(leading_count))
        .or_else(|| leading_count(&element_text(link)))
}

fn visible_text(page: &RenderedPage) -> Option<String> {
    first_capture(&FOLLOWERS, &page.text)
}
