use std::sync::LazyLock;

use doa_core::Platform;
use regex::Regex;
use scraper::Selector;

use super::profile_url::{classify, ProfileInput};
use super::{count_before, first_capture, PlatformExtractor, RenderedPage, Strategy};
use crate::html::{element_text, meta_contents};

pub(super) const EXTRACTOR: PlatformExtractor = PlatformExtractor {
    platform: Platform::Facebook,
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

const HOSTS: &[&str] = &["facebook.com", "fb.com"];

static FOLLOWERS: LazyLock<Regex> = LazyLock::new(|| count_before("followers|seguidores"));
static FOLLOWERS_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href*="followers"], a[href*="seguidores"]"#).expect("valid selector")
});

/// Full URLs are kept (page paths and `profile.php?id=` both occur); bare
/// page names are expanded.
fn normalize_url(input: &str) -> Option<String> {
    match classify(input, HOSTS)? {
        ProfileInput::Url(mut url) => {
            if url.path().trim_matches('/').is_empty() {
                return None;
            }
            url.set_fragment(None);
            if url.set_scheme("https").is_err() {
                return None;
            }
            Some(url.to_string())
        }
        ProfileInput::Handle(handle) => Some(format!("https://www.facebook.com/{handle}")),
    }
}

/// `"Creator. 12,345 likes · 1.2K talking about this · 15K followers"`
fn meta_description(page: &RenderedPage) -> Option<String> {
    meta_contents(&page.document(), &["description", "og:description"])
        .iter()
        .find_map(|content| first_capture(&FOLLOWERS, content))
}

fn followers_link(page: &RenderedPage) -> Option<String> {
    let document = page.document();
    document
        .select(&FOLLOWERS_LINK)
        .find_map(|link| first_capture(&FOLLOWERS, &element_text(link)))
}

fn visible_text(page: &RenderedPage) -> Option<String> {
    first_capture(&FOLLOWERS, &page.text)
}
